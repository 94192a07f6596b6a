use std::{
    path::{Path, PathBuf},
    time::Instant,
};

use anyhow::Context as _;
use clap::{Parser, Subcommand};
use storyboard::{
    EditorSession, EditorSettings, HeadlessOutput, ManualScheduler, PlaybackState,
    ScriptAssignment, Storyboard, format_clock,
};

#[derive(Parser, Debug)]
#[command(name = "storyboard", version)]
struct Cli {
    /// Editor settings JSON; `STORYBOARD_*` environment variables override it.
    #[arg(long, global = true)]
    settings: Option<PathBuf>,

    /// Log engine decisions to stderr.
    #[arg(long, short, global = true, default_value_t = false)]
    verbose: bool,

    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Render the waveform strip at a point in time as a PNG.
    Waveform(WaveformArgs),
    /// Play a storyboard on a virtual clock and print scene transitions.
    Simulate(SimulateArgs),
    /// Write the template script for a storyboard.
    Script(ScriptArgs),
}

#[derive(Parser, Debug)]
struct WaveformArgs {
    /// Input storyboard JSON.
    #[arg(long = "in")]
    in_path: PathBuf,

    /// Playhead position in seconds.
    #[arg(long, default_value_t = 0.0)]
    at: f64,

    /// Output PNG path.
    #[arg(long)]
    out: PathBuf,

    /// Strip width override.
    #[arg(long)]
    width: Option<u32>,

    /// Strip height override.
    #[arg(long)]
    height: Option<u32>,

    /// TTF/OTF font used to draw scene labels.
    #[arg(long)]
    font: Option<PathBuf>,
}

#[derive(Parser, Debug)]
struct SimulateArgs {
    /// Input storyboard JSON.
    #[arg(long = "in")]
    in_path: PathBuf,

    /// Tick interval override in milliseconds.
    #[arg(long)]
    tick_ms: Option<u64>,

    /// Start position in seconds.
    #[arg(long, default_value_t = 0.0)]
    from: f64,
}

#[derive(Parser, Debug)]
struct ScriptArgs {
    /// Input storyboard JSON.
    #[arg(long = "in")]
    in_path: PathBuf,

    /// Template selection seed.
    #[arg(long, default_value_t = 0)]
    seed: u64,

    /// Assign the script to the scenes and write the storyboard to `--out`.
    #[arg(long, default_value_t = false, requires = "out")]
    apply: bool,

    /// Output storyboard JSON (with `--apply`).
    #[arg(long)]
    out: Option<PathBuf>,
}

type CliSession = EditorSession<ManualScheduler, HeadlessOutput>;

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let level = if cli.verbose {
        tracing::Level::DEBUG
    } else {
        tracing::Level::WARN
    };
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_max_level(level)
        .init();

    let settings = load_settings(cli.settings.as_deref())?;
    match cli.cmd {
        Command::Waveform(args) => cmd_waveform(settings, args),
        Command::Simulate(args) => cmd_simulate(settings, args),
        Command::Script(args) => cmd_script(settings, args),
    }
}

fn load_settings(path: Option<&Path>) -> anyhow::Result<EditorSettings> {
    let settings = match path {
        Some(p) => EditorSettings::from_json_file(p)
            .with_context(|| format!("load settings '{}'", p.display()))?,
        None => EditorSettings::default(),
    };
    let settings = settings.with_env_overrides();
    settings.validate().context("invalid settings")?;
    Ok(settings)
}

fn open_session(settings: EditorSettings, in_path: &Path) -> anyhow::Result<CliSession> {
    let board = Storyboard::from_json_file(in_path)
        .with_context(|| format!("load storyboard '{}'", in_path.display()))?;
    Ok(EditorSession::open(
        settings,
        board,
        ManualScheduler::new(),
        HeadlessOutput::new(),
    )?)
}

fn cmd_waveform(mut settings: EditorSettings, args: WaveformArgs) -> anyhow::Result<()> {
    if let Some(w) = args.width {
        settings.waveform.width = w;
    }
    if let Some(h) = args.height {
        settings.waveform.height = h;
    }
    settings.validate().context("invalid waveform size")?;

    let mut sess = open_session(settings, &args.in_path)?;
    if let Some(font) = &args.font {
        let bytes =
            std::fs::read(font).with_context(|| format!("read font '{}'", font.display()))?;
        sess.set_label_font(bytes)?;
    }
    sess.seek(args.at);
    let frame = sess.render_waveform()?;

    if let Some(parent) = args.out.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("create output dir '{}'", parent.display()))?;
    }

    image::save_buffer_with_format(
        &args.out,
        &frame.data,
        frame.width,
        frame.height,
        image::ColorType::Rgba8,
        image::ImageFormat::Png,
    )
    .with_context(|| format!("write png '{}'", args.out.display()))?;

    eprintln!("wrote {}", args.out.display());
    Ok(())
}

fn cmd_simulate(mut settings: EditorSettings, args: SimulateArgs) -> anyhow::Result<()> {
    if let Some(ms) = args.tick_ms {
        settings.playback.tick_interval_ms = ms;
    }
    settings.validate().context("invalid tick interval")?;

    let mut sess = open_session(settings, &args.in_path)?;
    if sess.timeline().is_empty() {
        println!("timeline is empty, nothing to play");
        return Ok(());
    }

    sess.seek(args.from);
    let mut now = Instant::now();
    sess.play(now);
    let mut shown = None;
    print_scene(&mut sess, &mut shown);

    // generous bound so a malformed document cannot spin forever
    let total = sess.timeline().total_duration();
    let interval = sess.engine().tick_interval().as_secs_f64();
    let max_ticks = ((total / interval).ceil() as u64).saturating_mul(2) + 16;

    let mut ticks = 0u64;
    while sess.engine().is_playing() && ticks < max_ticks {
        let Some(tick) = sess.engine_mut().scheduler_mut().pop_next() else {
            break;
        };
        now += tick.after;
        sess.on_timer(tick.token, now);
        ticks += 1;
        print_scene(&mut sess, &mut shown);
    }

    for notice in sess.take_notices() {
        println!("notice: {}", notice.message);
    }
    let snap = sess.snapshot();
    match snap.state {
        PlaybackState::Ended => println!(
            "ended at {} after {ticks} ticks",
            format_clock(snap.global_time)
        ),
        state => println!("stopped in state {state:?} after {ticks} ticks"),
    }
    Ok(())
}

fn print_scene(sess: &mut CliSession, shown: &mut Option<usize>) {
    let snap = sess.snapshot();
    if snap.state == PlaybackState::Ended || *shown == Some(snap.cursor.scene_index) {
        return;
    }
    *shown = Some(snap.cursor.scene_index);
    if let Some(scene) = sess.current_scene() {
        let caption = scene
            .spoken_caption()
            .map(|c| format!(" \"{c}\""))
            .unwrap_or_default();
        let narrated = if scene.narration.is_some() {
            " [narrated]"
        } else {
            ""
        };
        println!(
            "{} scene {} ({}){caption}{narrated}",
            format_clock(snap.global_time),
            snap.cursor.scene_index + 1,
            scene.id,
        );
    }
}

fn cmd_script(settings: EditorSettings, args: ScriptArgs) -> anyhow::Result<()> {
    let mut sess = open_session(settings, &args.in_path)?;
    let outcome = sess.generate_script(args.seed);
    if let Some(text) = sess.script() {
        println!("{text}");
    }

    if !args.apply {
        return Ok(());
    }
    let Some(out) = args.out else {
        anyhow::bail!("--apply needs --out");
    };
    if let ScriptAssignment::CountMismatch { segments, scenes } = outcome {
        anyhow::bail!("script has {segments} segments for {scenes} scenes");
    }
    sess.to_storyboard()
        .write_json_file(&out)
        .with_context(|| format!("write storyboard '{}'", out.display()))?;
    eprintln!("wrote {}", out.display());
    Ok(())
}
