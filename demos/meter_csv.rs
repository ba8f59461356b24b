use std::time::{Duration, Instant};

use clap::Parser;
use csv::Writer;
use dasp_sample::Sample;
use dasp_signal::Signal;
use log::info;
use rtmeter::common::box_error::BoxError;
use rtmeter::common::config::{MeterSettings, DEFAULT_SETTINGS_FILE};
use rtmeter::meter::level_display::{LevelDisplay, RefreshState};
use rtmeter::meter::light_ladder::{LightLadder, DEFAULT_THRESHOLDS};
use rtmeter::meter::meter_bank::MeterBank;

/// Run a stereo tone burst through the meters and save what the display would show to a CSV file
///
/// The left channel carries the tone at the given level, the right channel 6 dB under it.

#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// Filename for the output
    #[arg(short, long)]
    out_file: String,

    /// Settings file
    #[arg(short, long, default_value = DEFAULT_SETTINGS_FILE)]
    settings: String,

    /// Frames per audio callback
    #[arg(short, long, default_value_t = 512)]
    block_size: usize,

    /// Tone frequency in Hz
    #[arg(short, long, default_value_t = 440.0)]
    frequency: f64,

    /// Tone level in dBFS
    #[arg(short, long, default_value_t = -6.0)]
    level: f64,

    /// Seconds of tone, followed by the same amount of silence
    #[arg(short, long, default_value_t = 2.0)]
    duration: f64,
}

/// One display refresh
#[derive(serde::Serialize)]
struct Row {
    time: f64,
    channel: usize,
    #[serde(rename = "avgDb")]
    avg_db: f64,
    #[serde(rename = "peakDb")]
    peak_db: f64,
    level: f32,
    #[serde(rename = "peakLevel")]
    peak_level: f32,
    #[serde(rename = "litLights")]
    lit_lights: usize,
}

fn main() -> Result<(), BoxError> {
    env_logger::init();
    let args = Args::parse();
    let settings = MeterSettings::load(&args.settings)?;
    info!("settings: {:?}", settings);

    let sample_rate = settings.sample_rate;
    let amp = 10f64.powf(args.level / 20.0);
    let tone_frames = (args.duration * sample_rate) as usize;
    let mut tone = dasp_signal::rate(sample_rate).const_hz(args.frequency).sine();
    let mut interleaved: Vec<i16> = Vec::with_capacity(4 * tone_frames);
    for _ in 0..tone_frames {
        let s = tone.next() * amp;
        interleaved.push(s.to_sample::<i16>());
        interleaved.push((s * 0.5).to_sample::<i16>());
    }
    interleaved.resize(4 * tone_frames, 0);

    let mut bank = MeterBank::build(&[0, 1], sample_rate)?;
    let mut display = LevelDisplay::new(settings.meter_table()?, bank.readings(), &settings);
    let mut ladder = LightLadder::new(settings.num_lights, &DEFAULT_THRESHOLDS);
    ladder.set_variable_intensity(settings.variable_intensity);
    let mut wtr = Writer::from_path(&args.out_file)?;

    let start = Instant::now();
    let refresh_frames = (display.refresh_interval().as_secs_f64() * sample_rate).max(1.0) as usize;
    let block_size = args.block_size.max(1);
    let mut frames_done = 0;
    let mut next_refresh = 0;
    display.set_running(true, start);

    for block in interleaved.chunks(2 * block_size) {
        let frames = block.len() / 2;
        bank.process_interleaved(block, 2, frames);
        frames_done += frames;
        while frames_done >= next_refresh {
            let time = next_refresh as f64 / sample_rate;
            display.refresh(start + Duration::from_secs_f64(time));
            write_rows(&mut wtr, &bank, &display, &ladder, time)?;
            next_refresh += refresh_frames;
        }
    }

    // let the display fall off after the audio stops
    let mut time = frames_done as f64 / sample_rate;
    display.set_running(false, start + Duration::from_secs_f64(time));
    loop {
        time += display.refresh_interval().as_secs_f64();
        let state = display.refresh(start + Duration::from_secs_f64(time));
        write_rows(&mut wtr, &bank, &display, &ladder, time)?;
        if state == RefreshState::Idle {
            break;
        }
    }
    wtr.flush()?;
    info!("wrote {} to {}", bank, args.out_file);
    Ok(())
}

fn write_rows(
    wtr: &mut Writer<std::fs::File>,
    bank: &MeterBank,
    display: &LevelDisplay,
    ladder: &LightLadder,
    time: f64,
) -> Result<(), BoxError> {
    let readings = bank.readings();
    for (channel, level) in display.levels().iter().enumerate() {
        wtr.serialize(Row {
            time,
            channel,
            avg_db: readings[channel].average_power_db(),
            peak_db: readings[channel].peak_power_db(),
            level: level.level,
            peak_level: level.peak_level,
            lit_lights: ladder
                .lights(level.level, level.peak_level)
                .filter(|l| l.intensity > 0.0)
                .count(),
        })?;
    }
    Ok(())
}
