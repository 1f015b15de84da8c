//! Writes TypeScript declarations of the ab-protocol types.
//!
//! The web dashboard imports these so its socket and REST handlers agree with
//! the Rust client on payload shapes.

use ab_protocol::*;
use anyhow::{Context, Result};
use clap::Parser;
use std::path::{Path, PathBuf};
use ts_rs::TS;

#[derive(Parser, Debug)]
#[command(name = "ab-protocol-ts", about = "Export ab-protocol types as TypeScript")]
struct Args {
    /// Directory the `.ts` files are written to.
    #[arg(long, default_value = "bindings")]
    out_dir: PathBuf,
}

fn main() -> Result<()> {
    let args = Args::parse();
    let written = export_bindings(&args.out_dir)?;
    println!("Wrote {written} declarations to {}", args.out_dir.display());
    Ok(())
}

/// Export every protocol type (and its dependencies) into `out_dir`.
///
/// Returns the number of root types exported.
fn export_bindings(out_dir: &Path) -> Result<usize> {
    std::fs::create_dir_all(out_dir)
        .with_context(|| format!("creating {}", out_dir.display()))?;

    macro_rules! export {
        ($($ty:ty),+ $(,)?) => {{
            let mut count = 0usize;
            $(
                <$ty>::export_all_to(out_dir)
                    .with_context(|| format!("exporting {}", stringify!($ty)))?;
                count += 1;
            )+
            count
        }};
    }

    Ok(export!(
        Project,
        ProjectStatus,
        Complexity,
        NewProject,
        ProjectUpdate,
        ProjectStats,
        GenerationStatus,
        AgentRole,
        AgentSlot,
        SlotState,
        ProgressMode,
        ProjectListResponse,
        ProjectResponse,
        StatsResponse,
        GenerationStatusResponse,
        GenerationAck,
        MessageResponse,
        StartGenerationRequest,
        ErrorBody,
        Op,
        Event,
        ClientConfig,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_export_writes_project_declaration() {
        let dir = tempfile::tempdir().unwrap();
        let count = export_bindings(dir.path()).unwrap();
        assert_eq!(count, 22);

        let project_ts = std::fs::read_to_string(dir.path().join("Project.ts")).unwrap();
        assert!(project_ts.contains("export type Project"));
        assert!(project_ts.contains("current_agent"));
    }
}
