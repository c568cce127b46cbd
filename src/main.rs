use std::path::PathBuf;

use clap::Parser;
use miette::Result;

use vigil_core::{CiContext, VigilConfig};
use vigil_review::github::{parse_repo_reference, GithubClient};
use vigil_review::llm::LlmClient;
use vigil_review::pipeline::{map_positions, ReviewPipeline};

#[derive(Parser)]
#[command(
    name = "vigil",
    version,
    about = "LLM pull-request review for CI",
    long_about = "Vigil reviews a pull request with an LLM and posts the feedback back:\n\
                   one inline comment per finding, anchored to the diff, plus an\n\
                   aggregated summary comment.\n\n\
                   Designed to run inside a CI job. Repository, PR number, and tokens\n\
                   come from the environment (GITHUB_REPOSITORY, GITHUB_TOKEN,\n\
                   OPENAI_API_KEY, and the Actions event payload); flags override them.\n\n\
                   Examples:\n  \
                     vigil                                 Review the PR from the CI event\n  \
                     vigil --repo owner/name --pr 42       Review an explicit PR\n  \
                     vigil --dry-run                       Print the review instead of posting\n  \
                     vigil --fail-on-errors                Exit non-zero if any post failed"
)]
struct Cli {
    /// Repository to review (format: owner/name; default: GITHUB_REPOSITORY)
    #[arg(long)]
    repo: Option<String>,

    /// Pull request number (default: VIGIL_PR_NUMBER or the event payload)
    #[arg(long)]
    pr: Option<u64>,

    /// Path to configuration file (default: .vigil.toml)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Generate the review but print it instead of posting
    #[arg(long)]
    dry_run: bool,

    /// Exit with code 1 if any comment or summary post failed
    #[arg(
        long,
        long_help = "Exit with code 1 if any comment or summary post failed.\n\n\
                       By default posting is best-effort: failures are reported on\n\
                       stderr and the process still exits 0. Use this in workflows\n\
                       that should go red on partial publishes."
    )]
    fail_on_errors: bool,

    /// Enable verbose output
    #[arg(long, short)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    miette::set_hook(Box::new(|_| {
        Box::new(
            miette::MietteHandlerOpts::new()
                .terminal_links(true)
                .build(),
        )
    }))
    .expect("miette handler");
    human_panic::setup_panic!();

    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => VigilConfig::from_file(path)?,
        None => {
            let default_path = std::path::Path::new(".vigil.toml");
            if default_path.exists() {
                VigilConfig::from_file(default_path)?
            } else {
                VigilConfig::default()
            }
        }
    };

    let ctx = CiContext::resolve(cli.repo.clone(), cli.pr)?;
    parse_repo_reference(&ctx.repo)?;

    if cli.verbose {
        eprintln!("repo: {} PR #{}", ctx.repo, ctx.pr_number);
        eprintln!("model: {}", config.llm.model);
    }

    let llm = LlmClient::new(&config.llm)?;
    let github = GithubClient::new(&ctx.github_token)?;
    let pipeline = ReviewPipeline::new(llm, github, config);

    let files = pipeline.fetch(&ctx.repo, ctx.pr_number).await?;
    let reviewable = files.iter().filter(|f| !f.patch.is_empty()).count();
    if cli.verbose {
        eprintln!(
            "{} changed files, {} with a reviewable patch",
            files.len(),
            reviewable,
        );
    }
    if reviewable == 0 {
        eprintln!("No reviewable changes in {}#{}.", ctx.repo, ctx.pr_number);
        return Ok(());
    }

    let review = pipeline.generate(&files).await?;

    if cli.dry_run {
        let anchored = map_positions(&review);
        println!(
            "Would post {} inline comments to {}#{}:",
            anchored.len(),
            ctx.repo,
            ctx.pr_number,
        );
        for comment in &anchored {
            println!("  {}:{}  {}", comment.filename, comment.position, comment.body);
        }
        println!("\n{}", review.aggregated_summary(pipeline.config()));
        return Ok(());
    }

    let report = pipeline.publish(&ctx.repo, ctx.pr_number, &review).await;
    eprint!("{report}");

    if cli.fail_on_errors && report.has_failures() {
        std::process::exit(1);
    }
    Ok(())
}
