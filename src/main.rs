// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

use std::env;
use std::fs::File;
use std::sync::Mutex;

use anyhow::{anyhow, bail, Context, Result};
use crossterm::event::Event;

use piano::audio::{self, AudioEngine};
use piano::config::PianoConfig;
use piano::control::{InputDispatcher, KeyboardController};
use piano::engine::PlaybackEngine;
use piano::ui::App;

fn print_usage() {
    println!("piano - Terminal virtual piano");
    println!();
    println!("Usage: piano [OPTIONS]");
    println!();
    println!("Options:");
    println!("  --config <PATH>         Load settings from a YAML file");
    println!("  --write-config <PATH>   Write the default settings to a YAML file");
    println!("  --list-devices          List available audio output devices");
    println!("  --help                  Show this help message");
}

fn list_devices() {
    let devices = audio::list_devices();
    if devices.is_empty() {
        println!("No audio output devices found");
        return;
    }
    let default = audio::default_device_name();
    for (i, name) in devices.iter().enumerate() {
        let marker = if Some(name) == default.as_ref() { " (default)" } else { "" };
        println!("  {}: {}{}", i, name, marker);
    }
}

fn init_logging(config: &PianoConfig) -> Result<()> {
    let file = File::create(&config.logging.file)
        .with_context(|| format!("Failed to create log file: {:?}", config.logging.file))?;
    tracing_subscriber::fmt()
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .with_max_level(config.logging.level()?)
        .try_init()
        .map_err(|e| anyhow!("Failed to install logger: {}", e))
}

fn run(config: PianoConfig) -> Result<()> {
    init_logging(&config)?;

    let keymap = config.keys.keymap()?;
    let keyboard = KeyboardController::with_defaults();
    let shadowed = keyboard.conflicts(&keymap);
    if !shadowed.is_empty() {
        bail!("Piano keys clash with control keys: {:?}", shadowed);
    }

    let mut audio = AudioEngine::new(config.audio.output_config());
    let audio_ok = match audio.start() {
        Ok(()) => true,
        Err(e) => {
            tracing::warn!("audio output unavailable: {}", e);
            false
        }
    };

    let mut engine = PlaybackEngine::with_config(&config.playback, keymap, audio.sink());
    let mut dispatcher = InputDispatcher::new(keyboard, config.export.path.clone());

    let mut app = App::new().context("Failed to initialize terminal")?;
    if !audio_ok {
        app.set_status("No audio output; notes will be silent");
    } else if !app.reports_key_releases() {
        app.set_status("Terminal does not report key releases; notes end on their own");
    }
    tracing::info!("piano started");

    while app.is_running() {
        engine.reap_finished();
        app.draw(&engine, dispatcher.keyboard())?;

        let input = match app.poll_event()? {
            Some(Event::Key(key)) => dispatcher.translate_key(&key, engine.keymap()),
            Some(Event::Mouse(mouse)) => {
                let keymap = engine.keymap();
                dispatcher.translate_mouse(&mouse, |column, row| app.key_at(keymap, column, row))
            }
            _ => None,
        };

        if let Some(input) = input {
            let feedback = dispatcher.dispatch(&mut engine, input);
            app.apply(feedback);
        }
    }

    engine.shutdown();
    audio.stop();
    tracing::info!("piano stopped");
    Ok(())
}

fn main() -> Result<()> {
    let args: Vec<String> = env::args().collect();

    match args.get(1).map(String::as_str) {
        None => run(PianoConfig::default()),
        Some("--config") => {
            let Some(path) = args.get(2) else {
                eprintln!("Error: --config requires a file path");
                std::process::exit(1);
            };
            run(PianoConfig::load(path)?)
        }
        Some("--write-config") => {
            let Some(path) = args.get(2) else {
                eprintln!("Error: --write-config requires a file path");
                std::process::exit(1);
            };
            PianoConfig::default().save(path)?;
            println!("Default configuration written to {}", path);
            Ok(())
        }
        Some("--list-devices") => {
            list_devices();
            Ok(())
        }
        Some("--help") | Some("-h") => {
            print_usage();
            Ok(())
        }
        Some(other) => {
            eprintln!("Unknown option: {}", other);
            print_usage();
            std::process::exit(1);
        }
    }
}
