use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};

use readpatch::config::{RepairConfig, DEFAULT_LOWQ, DEFAULT_MAXGAP, DEFAULT_MIN_LEN};
use readpatch::db::FileReadDb;
use readpatch::fasta::{write_fasta, write_quality};
use readpatch::overlapfile::OverlapFile;
use readpatch::pipeline::repair_all;
use readpatch::trackfile::{IntervalTrackFile, SegmentTrackFile, TrimTrackFile};
use readpatch::tracks::{NoTrimTrack, TrimTrack, UserTrack};

/// Per-read gap/low-quality patching and chimera trimming for
/// long-read assembly overlap graphs.
#[derive(Parser)]
#[command(name = "patch", version, about)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Repair reads against an overlap set, emitting patched FASTA.
    Run(RunArgs),
    /// Emit a small synthetic read database and overlap file for
    /// smoke-testing the pipeline end to end.
    Generate(GenerateArgs),
}

#[derive(Parser)]
struct RunArgs {
    /// Read-database path.
    db: PathBuf,
    /// Overlap file path.
    overlaps: PathBuf,
    /// Output FASTA path.
    output: PathBuf,

    /// Segment-quality track path (required; spec's "track q").
    #[arg(long)]
    quality_track: PathBuf,
    /// Mask-track path (required; spec's "track dust").
    #[arg(long)]
    mask_track: PathBuf,

    /// Minimum length for an emitted sequence.
    #[arg(short = 'x', long, default_value_t = DEFAULT_MIN_LEN)]
    min_len: u32,
    /// Segment low-quality threshold.
    #[arg(short = 'Q', long, default_value_t = DEFAULT_LOWQ)]
    lowq: u8,
    /// Maximum A- or donor-length of a patchable gap.
    #[arg(short = 'g', long, default_value_t = DEFAULT_MAXGAP)]
    maxgap: u32,
    /// W-segment width underlying the quality track.
    #[arg(short = 'w', long, default_value_t = 500)]
    segment_width: u32,

    /// Optional path to emit parallel quality streams for patched reads.
    #[arg(short = 'q', long)]
    quality_out: Option<PathBuf>,
    /// Optional trim-track path.
    #[arg(short = 't', long)]
    trim_track: Option<PathBuf>,
    /// User track to remap, given as `name=path`; may repeat.
    #[arg(short = 'c', long = "user-track", value_name = "NAME=PATH")]
    user_tracks: Vec<String>,

    /// Worker thread count for the rayon pool (default: all cores).
    #[arg(short = 'j', long)]
    threads: Option<usize>,
    /// Print per-run summary counts to stderr.
    #[arg(long)]
    stats: bool,
}

#[derive(Parser)]
struct GenerateArgs {
    /// Output read-database path.
    db: PathBuf,
    /// Output overlap-file path.
    overlaps: PathBuf,
    /// Output quality-track path.
    quality_track: PathBuf,
    /// Output mask-track path.
    mask_track: PathBuf,
    /// Number of synthetic reads.
    #[arg(short = 'n', long, default_value_t = 8)]
    num_reads: usize,
    /// Length of each synthetic read.
    #[arg(short = 'l', long, default_value_t = 4000)]
    read_len: u32,
    /// Segment width used when sizing the quality track.
    #[arg(short = 'w', long, default_value_t = 500)]
    segment_width: u32,
    /// RNG seed.
    #[arg(short = 's', long, default_value_t = 1)]
    seed: u64,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    let result = match cli.command {
        Command::Run(args) => run(args),
        Command::Generate(args) => generate(args),
    };
    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(message) => {
            eprintln!("patch: {message}");
            ExitCode::FAILURE
        }
    }
}

fn run(args: RunArgs) -> Result<(), String> {
    if let Some(j) = args.threads {
        rayon::ThreadPoolBuilder::new()
            .num_threads(j)
            .build_global()
            .map_err(|e| e.to_string())?;
    }

    let db = FileReadDb::open(&args.db).map_err(|e| e.to_string())?;
    let overlaps = OverlapFile::open(&args.overlaps).map_err(|e| e.to_string())?;
    let quality = SegmentTrackFile::open(&args.quality_track).map_err(|e| e.to_string())?;
    let mask = IntervalTrackFile::open(&args.mask_track, "dust").map_err(|e| e.to_string())?;

    let trim_track_file;
    let trim: &(dyn TrimTrack + Sync) = match &args.trim_track {
        Some(path) => {
            trim_track_file = TrimTrackFile::open(path).map_err(|e| e.to_string())?;
            &trim_track_file
        }
        None => &NoTrimTrack,
    };

    let mut user_track_files = Vec::new();
    for spec in &args.user_tracks {
        let (name, path) = spec
            .split_once('=')
            .ok_or_else(|| format!("user track `{spec}` must be given as name=path"))?;
        user_track_files.push(IntervalTrackFile::open(path, name).map_err(|e| e.to_string())?);
    }
    let user_tracks: Vec<&(dyn UserTrack + Sync)> =
        user_track_files.iter().map(|t| t as &(dyn UserTrack + Sync)).collect();

    let cfg = RepairConfig::new(args.segment_width)
        .with_min_len(args.min_len)
        .with_lowq(args.lowq)
        .with_maxgap(args.maxgap);

    let reads = repair_all(&db, &overlaps, &quality, &mask, trim, &user_tracks, &cfg)
        .map_err(|e| e.to_string())?;

    let mut out = std::io::BufWriter::new(
        std::fs::File::create(&args.output)
            .map_err(|e| readpatch::PatchError::OutputOpen(e.to_string()).to_string())?,
    );
    for read in &reads {
        write_fasta(&mut out, read).map_err(|e| e.to_string())?;
    }

    if let Some(q_path) = &args.quality_out {
        let mut qout = std::io::BufWriter::new(
            std::fs::File::create(q_path)
                .map_err(|e| readpatch::PatchError::OutputOpen(e.to_string()).to_string())?,
        );
        for read in &reads {
            write_quality(&mut qout, read).map_err(|e| e.to_string())?;
        }
    }

    if args.stats {
        let fixed = reads.iter().filter(|r| r.kind == readpatch::ReadKind::Fixed).count();
        let pct = if reads.is_empty() { 0.0 } else { 100.0 * fixed as f64 / reads.len() as f64 };
        let mut buf = ryu::Buffer::new();
        eprintln!(
            "patch: {} reads emitted, {} patched, {} trimmed-only ({}% patched)",
            reads.len(),
            fixed,
            reads.len() - fixed,
            buf.format(pct)
        );
    }

    Ok(())
}

fn generate(args: GenerateArgs) -> Result<(), String> {
    use std::io::Write;

    let world = readpatch::testutil::generate_world(
        args.seed,
        args.num_reads,
        args.read_len,
        args.segment_width,
        args.segment_width.min(200),
    );

    let mut db_file =
        std::fs::File::create(&args.db).map_err(|e| format!("could not open output: {e}"))?;
    let k = world.db.seqs.first().map_or(0, |_| 2usize);
    db_file
        .write_all(&(world.db.seqs.len() as u32).to_le_bytes())
        .map_err(|e| e.to_string())?;
    db_file.write_all(&(k as u32).to_le_bytes()).map_err(|e| e.to_string())?;
    for (i, seq) in world.db.seqs.iter().enumerate() {
        db_file.write_all(&(seq.len() as u32).to_le_bytes()).map_err(|e| e.to_string())?;
        db_file.write_all(seq).map_err(|e| e.to_string())?;
        for stream in &world.db.quality[i] {
            db_file.write_all(stream).map_err(|e| e.to_string())?;
        }
    }

    let mut quality_file =
        std::fs::File::create(&args.quality_track).map_err(|e| format!("could not open output: {e}"))?;
    for (i, segs) in world.quality.iter().enumerate() {
        let values: Vec<String> = segs.iter().map(u8::to_string).collect();
        writeln!(quality_file, "{} {}", i, values.join(",")).map_err(|e| e.to_string())?;
    }

    let mut mask_file =
        std::fs::File::create(&args.mask_track).map_err(|e| format!("could not open output: {e}"))?;
    for i in 0..world.db.seqs.len() {
        writeln!(mask_file, "{i}").map_err(|e| e.to_string())?;
    }

    let mut overlap_file =
        std::fs::File::create(&args.overlaps).map_err(|e| format!("could not open output: {e}"))?;
    for group in &world.overlaps.by_a {
        for o in group {
            let orientation = if o.orientation.is_complement() { "C" } else { "N" };
            let trace: Vec<String> = o.trace.iter().map(|t| format!("{}:{}", t.diff, t.blen)).collect();
            writeln!(
                overlap_file,
                "{} {} {} {} {} {} {} {}",
                o.a, o.b, orientation, o.a_span.start, o.a_span.end, o.b_span.start, o.b_span.end, trace.join(",")
            )
            .map_err(|e| e.to_string())?;
        }
    }

    Ok(())
}
