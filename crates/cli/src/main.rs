use anyhow::{ensure, Context, Result};
use armsim::device::{degrees_to_command, ArmController, StreamChannel};
use armsim::policy::{JacobianPolicy, Policy, RandomPolicy};
use armsim::rollout::{self, converge, ConvergeCfg, EpisodeStats};
use armsim::{Arm, ArmCfg, Goal};
use clap::{Parser, Subcommand, ValueEnum};
use polars::prelude::*;
use serde_json::json;
use std::fs::{File, OpenOptions};
use std::io::BufReader;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing_subscriber::fmt::SubscriberBuilder;

mod provenance;

use provenance::{ensure_parent, write_sidecar, RunInfo};

#[derive(Parser)]
#[command(name = "armsim-cli")]
#[command(about = "Planar arm simulator: training rollouts, goal queries and poses")]
struct Cmd {
    /// JSON arm configuration; missing fields take defaults
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Override the configured sampling seed
    #[arg(long, global = true)]
    seed: Option<u64>,

    #[command(subcommand)]
    action: Action,
}

#[derive(Subcommand)]
enum Action {
    /// Run training episodes and write per-episode stats as CSV
    Train {
        #[arg(long, default_value_t = 100)]
        episodes: usize,
        #[arg(long, default_value_t = 200)]
        max_steps: usize,
        #[arg(long, value_enum, default_value_t = PolicyKind::Random)]
        policy: PolicyKind,
        #[arg(long)]
        out: PathBuf,
    },
    /// Converge on one goal and print the joint angles
    Query {
        #[arg(long, allow_hyphen_values = true)]
        x: f64,
        #[arg(long, allow_hyphen_values = true)]
        y: f64,
        #[arg(long, default_value_t = 200)]
        max_steps: usize,
        #[arg(long)]
        timeout_ms: Option<u64>,
        /// Serial device (or any read/write file) to send the angles to
        #[arg(long)]
        device: Option<PathBuf>,
    },
    /// Set joint angles (degrees, root to tip) and print the scene as JSON
    Pose {
        #[arg(allow_hyphen_values = true)]
        angles: Vec<f64>,
    },
    /// Print a small provenance JSON block
    Report,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum PolicyKind {
    Random,
    Jacobian,
}

fn main() -> Result<()> {
    SubscriberBuilder::default().with_target(false).init();
    let cmd = Cmd::parse();
    let cfg = load_cfg(cmd.config.as_deref(), cmd.seed)?;
    match cmd.action {
        Action::Train {
            episodes,
            max_steps,
            policy,
            out,
        } => train(&cfg, episodes, max_steps, policy, &out),
        Action::Query {
            x,
            y,
            max_steps,
            timeout_ms,
            device,
        } => query(&cfg, Goal::new(x, y, cfg.goal_size), max_steps, timeout_ms, device.as_deref()),
        Action::Pose { angles } => pose(&cfg, &angles),
        Action::Report => report(&cfg),
    }
}

fn load_cfg(path: Option<&Path>, seed: Option<u64>) -> Result<ArmCfg> {
    let mut cfg = match path {
        Some(path) => {
            let bytes = std::fs::read(path).with_context(|| format!("reading {}", path.display()))?;
            serde_json::from_slice(&bytes).with_context(|| format!("parsing {}", path.display()))?
        }
        None => ArmCfg::default(),
    };
    if let Some(seed) = seed {
        cfg.seed = seed;
    }
    let size = cfg.env_size;
    let positive = |v: f64| v.is_finite() && v > 0.0;
    ensure!(
        positive(size.width) && positive(size.height),
        "env_size must be positive and finite, got {}x{}",
        size.width,
        size.height
    );
    Ok(cfg)
}

fn make_policy(kind: PolicyKind, arm: &Arm, seed: u64) -> Box<dyn Policy> {
    match kind {
        PolicyKind::Random => Box::new(RandomPolicy::new(arm.action_dim(), seed)),
        PolicyKind::Jacobian => Box::new(JacobianPolicy::new(arm.origin(), arm.env_size())),
    }
}

fn train(
    cfg: &ArmCfg,
    episodes: usize,
    max_steps: usize,
    kind: PolicyKind,
    out: &Path,
) -> Result<()> {
    tracing::info!(episodes, max_steps, policy = ?kind, out = %out.display(), "train");
    let mut arm = Arm::from_cfg(cfg);
    let mut policy = make_policy(kind, &arm, cfg.seed);
    let rollout_cfg = ConvergeCfg {
        max_steps,
        ..ConvergeCfg::default()
    };
    let stats = rollout::train(&mut arm, &mut policy, episodes, &rollout_cfg, None)
        .context("training rollouts")?;

    let mut df = stats_frame(&stats)?;
    write_csv(&mut df, out)?;

    let summary = df
        .clone()
        .lazy()
        .select([
            col("reward").mean().alias("mean_reward"),
            col("steps").mean().alias("mean_steps"),
            col("done").cast(DataType::UInt32).sum().alias("reached"),
        ])
        .collect()?;
    println!("{summary}");

    let info = RunInfo::new(
        "train",
        cfg,
        json!({ "episodes": episodes, "max_steps": max_steps, "policy": format!("{kind:?}") }),
    )?;
    write_sidecar(out, &info)?;
    Ok(())
}

fn stats_frame(stats: &[EpisodeStats]) -> Result<DataFrame> {
    let episode: Vec<u64> = stats.iter().map(|s| s.episode as u64).collect();
    let steps: Vec<u64> = stats.iter().map(|s| s.steps as u64).collect();
    let reward: Vec<f64> = stats.iter().map(|s| s.reward).collect();
    let done: Vec<bool> = stats.iter().map(|s| s.done).collect();
    Ok(df!(
        "episode" => episode,
        "steps" => steps,
        "reward" => reward,
        "done" => done
    )?)
}

fn write_csv(df: &mut DataFrame, out: &Path) -> Result<()> {
    ensure_parent(out)?;
    let mut file = File::create(out).with_context(|| format!("creating {}", out.display()))?;
    CsvWriter::new(&mut file)
        .include_header(true)
        .finish(df)
        .with_context(|| format!("writing {}", out.display()))?;
    Ok(())
}

fn query(
    cfg: &ArmCfg,
    goal: Goal,
    max_steps: usize,
    timeout_ms: Option<u64>,
    device: Option<&Path>,
) -> Result<()> {
    let mut arm = Arm::from_cfg(cfg);
    let mut policy = JacobianPolicy::new(arm.origin(), arm.env_size());
    let rollout_cfg = ConvergeCfg {
        max_steps,
        timeout: timeout_ms.map(Duration::from_millis),
        plateau: None,
    };
    let out = converge(&mut arm, &mut policy, goal, &rollout_cfg);
    tracing::info!(steps = out.steps, stop = ?out.stop, "query");
    let doc = json!({
        "goal": [goal.center.x, goal.center.y],
        "angles_deg": out.angles_deg,
        "steps": out.steps,
        "stop": format!("{:?}", out.stop),
        "reward": out.reward,
    });
    println!("{}", serde_json::to_string_pretty(&doc)?);

    if let Some(path) = device {
        // Separate handles so reads and writes keep independent offsets on
        // regular files.
        let reader = File::open(path)
            .map(BufReader::new)
            .with_context(|| format!("opening device {} for reading", path.display()))?;
        let writer = OpenOptions::new()
            .append(true)
            .open(path)
            .with_context(|| format!("opening device {} for writing", path.display()))?;
        let mut ctl = ArmController::connect(StreamChannel::new(reader, writer))?;
        let ack = ctl
            .move_to(&degrees_to_command(&out.angles_deg))
            .context("sending angles to device")?;
        ctl.close()?;
        println!("ack: {ack}");
    }
    Ok(())
}

fn pose(cfg: &ArmCfg, angles: &[f64]) -> Result<()> {
    let mut arm = Arm::from_cfg(cfg);
    arm.set_angles(angles)?;
    println!("{}", serde_json::to_string_pretty(&arm.scene())?);
    Ok(())
}

fn report(cfg: &ArmCfg) -> Result<()> {
    let info = RunInfo::new("report", cfg, json!({}))?;
    println!("{}", serde_json::to_string_pretty(&info.to_json(&[]))?);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn config_file_and_seed_override() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("arm.json");
        std::fs::write(&path, r#"{"seed": 3, "dwell_steps": 5}"#).unwrap();
        let cfg = load_cfg(Some(&path), None).unwrap();
        assert_eq!((cfg.seed, cfg.dwell_steps), (3, 5));
        let cfg = load_cfg(Some(&path), Some(9)).unwrap();
        assert_eq!(cfg.seed, 9);
        assert!(load_cfg(Some(&dir.path().join("missing.json")), None).is_err());
    }

    #[test]
    fn degenerate_plane_is_rejected() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("flat.json");
        std::fs::write(&path, r#"{"env_size": {"width": 0.0, "height": 0.0}}"#).unwrap();
        let err = load_cfg(Some(&path), None).unwrap_err();
        assert!(err.to_string().contains("env_size"), "{err}");

        std::fs::write(&path, r#"{"env_size": {"width": 50.0, "height": -1.0}}"#).unwrap();
        assert!(load_cfg(Some(&path), None).is_err());
    }

    #[test]
    fn train_writes_csv_and_sidecar() {
        let dir = tempdir().unwrap();
        let out = dir.path().join("runs").join("episodes.csv");
        train(&ArmCfg::default(), 3, 20, PolicyKind::Random, &out).unwrap();

        let df = LazyCsvReader::new(&out)
            .with_infer_schema_length(Some(100))
            .finish()
            .unwrap()
            .collect()
            .unwrap();
        assert_eq!(df.shape(), (3, 4));
        assert!(dir.path().join("runs").join("episodes.provenance.json").exists());
    }

    #[test]
    fn query_reports_through_device_file() {
        let dir = tempdir().unwrap();
        let dev = dir.path().join("tty");
        std::fs::write(&dev, "ok\n").unwrap();
        query(
            &ArmCfg::default(),
            Goal::new(100.0, 150.0, 30.0),
            20,
            None,
            Some(&dev),
        )
        .unwrap();
        let written = std::fs::read_to_string(&dev).unwrap();
        assert!(written.starts_with("ok\n"));
        assert_eq!(written.lines().count(), 2);
    }

    #[test]
    fn pose_rejects_wrong_angle_count() {
        assert!(pose(&ArmCfg::default(), &[10.0]).is_err());
        assert!(pose(&ArmCfg::default(), &[10.0, 20.0]).is_ok());
    }
}
