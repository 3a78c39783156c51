use anyhow::{bail, Context, Result};
use std::env;
use std::fs;
use std::path::PathBuf;

use rtttl_tone::{export_to_wav, PlayerConfig, RtttlParser};

const USAGE: &str = "Usage:
  rtttl-tone [options] <file.rtttl>
  rtttl-tone [options] -e <RTTTL text>

Options:
  -e, --eval <TEXT>        Play RTTTL text given on the command line
  --dump                   Print the parsed song as JSON and exit
  --render <OUT.wav>       Render the song to a WAV file instead of playing it
  --volume <0-10>          Playback volume (default 10)
  --octave-offset <N>      Transpose every note by N octaves
  --background             Play in the background ([space]=pause/resume, [q]=quit)
  --config <FILE>          Load settings from a JSON file
  -h, --help               Show this help

Examples:
  rtttl-tone -e \"beep:d=8,o=6,b=180:c,e,g\"
  rtttl-tone --render tune.wav songs/tune.rtttl";

/// Where the song text comes from
enum SongSource {
    File(PathBuf),
    Inline(String),
}

#[derive(Default)]
struct CliArgs {
    source: Option<SongSource>,
    dump: bool,
    render: Option<PathBuf>,
    volume: Option<u8>,
    octave_offset: Option<i8>,
    background: bool,
    config: Option<PathBuf>,
    show_help: bool,
}

fn parse_args<I: Iterator<Item = String>>(mut args: I) -> Result<CliArgs> {
    let mut cli = CliArgs::default();

    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--help" | "-h" => cli.show_help = true,
            "--dump" => cli.dump = true,
            "--background" => cli.background = true,
            "-e" | "--eval" => {
                let text = args.next().context("-e requires RTTTL text")?;
                cli.source = Some(SongSource::Inline(text));
            }
            "--render" => {
                let path = args.next().context("--render requires an output path")?;
                cli.render = Some(PathBuf::from(path));
            }
            "--config" => {
                let path = args.next().context("--config requires a file path")?;
                cli.config = Some(PathBuf::from(path));
            }
            "--volume" => {
                let value = args.next().context("--volume requires a value")?;
                let volume = value
                    .parse::<u8>()
                    .with_context(|| format!("Invalid volume: {}", value))?;
                cli.volume = Some(volume);
            }
            "--octave-offset" => {
                let value = args.next().context("--octave-offset requires a value")?;
                let offset = value
                    .parse::<i8>()
                    .with_context(|| format!("Invalid octave offset: {}", value))?;
                cli.octave_offset = Some(offset);
            }
            _ if arg.starts_with('-') => bail!("Unknown flag: {}", arg),
            _ => cli.source = Some(SongSource::File(PathBuf::from(arg))),
        }
    }

    Ok(cli)
}

fn read_song_text(source: &SongSource) -> Result<String> {
    match source {
        SongSource::Inline(text) => Ok(text.trim().to_string()),
        SongSource::File(path) => {
            let text = fs::read_to_string(path)
                .with_context(|| format!("Failed to read file '{}'", path.display()))?;
            Ok(text.trim().to_string())
        }
    }
}

fn run() -> Result<()> {
    let cli = parse_args(env::args().skip(1))?;

    let source = match cli.source {
        Some(ref source) if !cli.show_help => source,
        _ => {
            eprintln!("{}", USAGE);
            return Ok(());
        }
    };

    let mut config = match cli.config {
        Some(ref path) => PlayerConfig::load(path)
            .with_context(|| format!("Failed to load config '{}'", path.display()))?,
        None => PlayerConfig::default(),
    };
    if let Some(volume) = cli.volume {
        config.volume = volume;
    }
    if let Some(offset) = cli.octave_offset {
        config.octave_offset = offset;
    }
    config.background |= cli.background;
    let config = config.validate()?;

    let text = read_song_text(source)?;

    if cli.dump {
        let song = RtttlParser::with_octave_offset(config.octave_offset).parse(&text)?;
        println!("{}", serde_json::to_string_pretty(&song)?);
        return Ok(());
    }

    if let Some(ref path) = cli.render {
        let song = RtttlParser::with_octave_offset(config.octave_offset).parse(&text)?;
        println!("Rendering '{}' ({} notes)...", song.title(), song.len());
        let length_ms = export_to_wav(song, path, &config)?;
        println!(
            "Wrote {} ({:.2} seconds)",
            path.display(),
            length_ms as f32 / 1000.0
        );
        return Ok(());
    }

    play(&text, &config)
}

#[cfg(feature = "streaming")]
fn play(text: &str, config: &PlayerConfig) -> Result<()> {
    use std::io::{self, Read, Write};
    use std::sync::mpsc;
    use std::thread;
    use std::time::Duration;

    use rtttl_tone::{
        AudioOutput, PlayOptions, PlaybackState, RtttlPlayer, SystemTimer, TickThread,
    };

    let output = AudioOutput::open()?;
    let timer = SystemTimer::new();
    let armed = timer.armed_flag();
    let player = RtttlPlayer::with_config(output.actuator(config.sample_rate), timer, config);
    let options = PlayOptions::from_config(config);

    if !options.background {
        player.parse_and_play(text, options)?;
        return Ok(());
    }

    let mut ticks = TickThread::spawn(
        player.ticker(),
        armed,
        Duration::from_millis(config.tick_interval_ms),
    );
    player.parse_and_play(text, options)?;
    println!(
        "Playing '{}' - keys: [space]=pause/resume, [q]=quit",
        player.current_song_name().trim_end()
    );

    let (tx, rx) = mpsc::channel::<u8>();
    thread::spawn(move || {
        #[cfg(unix)]
        let _ = std::process::Command::new("stty")
            .arg("-echo")
            .arg("raw")
            .status();
        let mut stdin = io::stdin();
        let mut buf = [0u8; 1];
        while stdin.read_exact(&mut buf).is_ok() {
            if tx.send(buf[0]).is_err() {
                break;
            }
        }
    });

    loop {
        thread::sleep(Duration::from_millis(50));
        while let Ok(key) = rx.try_recv() {
            match key {
                b' ' => player.pause_resume(),
                b'q' | b'Q' | b'\x03' => player.stop(),
                _ => {}
            }
        }

        let state = player.state();
        print!("\x1B[2K\r{:?}", state);
        io::stdout().flush().ok();
        if state == PlaybackState::Idle {
            break;
        }
    }

    ticks.shutdown();
    #[cfg(unix)]
    let _ = std::process::Command::new("stty")
        .arg("echo")
        .arg("-raw")
        .status();
    println!("\r\nPlayback complete!");
    Ok(())
}

#[cfg(not(feature = "streaming"))]
fn play(_text: &str, _config: &PlayerConfig) -> Result<()> {
    bail!(
        "Playback requires the \"streaming\" feature. Rebuild with `--features streaming`, \
         or use --render / --dump."
    )
}

fn main() {
    env_logger::init();

    if let Err(e) = run() {
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}
