use crate::arena::report::ArenaReport;
use crate::arena::{run_match, MatchSpec};
use crate::cgroup::ResourceLimits;
use crate::cli::args::{ArenaArgs, OutputFormat};
use guess_core::{Role, StartupTrace};
use std::time::Duration;

pub async fn run(args: ArenaArgs) -> anyhow::Result<i32> {
    StartupTrace::collect(Role::Arena).emit();

    let result = run_match(build_spec(&args)).await?;
    let report = ArenaReport::from_result(&result);
    match args.format {
        OutputFormat::Text => print!("{}", report.render_text()),
        OutputFormat::Json => println!("{}", serde_json::to_string(&report)?),
    }
    Ok(result.outcome.exit_code())
}

fn build_spec(args: &ArenaArgs) -> MatchSpec {
    let limits = (!args.no_cgroup).then(|| ResourceLimits {
        memory_max_mb: Some(args.memory_limit_mb),
        cpu_max: Some(args.cpu_max.clone()),
    });
    MatchSpec {
        judge: args.judge.clone(),
        judge_args: args.judge_args.clone(),
        player: args.player.clone(),
        player_args: args.player_args.clone(),
        timeout: Duration::from_millis(args.timeout),
        limits,
        judge_rootfs: args.judge_rootfs.clone(),
        player_rootfs: args.player_rootfs.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;
    use std::path::PathBuf;

    #[test]
    fn test_build_spec_limits() {
        let args = ArenaArgs::try_parse_from(["arena", "--timeout", "250"]).unwrap();
        let spec = build_spec(&args);
        assert_eq!(spec.timeout, Duration::from_millis(250));
        assert_eq!(spec.judge.to_str(), Some("/bin/judge"));
        assert_eq!(
            spec.limits,
            Some(ResourceLimits {
                memory_max_mb: Some(100),
                cpu_max: Some("100000 1000000".into()),
            })
        );

        let args = ArenaArgs::try_parse_from(["arena", "--no-cgroup"]).unwrap();
        assert!(build_spec(&args).limits.is_none());

        let args = ArenaArgs::try_parse_from(["arena", "--player-rootfs", "/srv/player"]).unwrap();
        let spec = build_spec(&args);
        assert_eq!(spec.player_rootfs, Some(PathBuf::from("/srv/player")));
        assert!(spec.judge_rootfs.is_none());
    }
}
