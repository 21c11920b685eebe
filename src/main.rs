use clap::Parser;
use dotenv::dotenv;
use lyveprov::cli::{self, Commands};
use lyveprov::models::ServiceAccountCredential;
use lyveprov::naming::{BucketName, ResourcePrefix};
use lyveprov::pipeline::Pipeline;
use lyveprov::storage::{BucketClient, S3BucketClient};
use lyveprov::{ProvisionError, prompt, provider};

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    // 加载 .env 文件
    dotenv().ok();

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = cli::Cli::parse();

    match args.command {
        Commands::Provision(args) => {
            let config = args.to_config()?;
            let credential =
                prompt::collect_tenant_credential(config.api_version, args.credential_input())?;

            let http = config.http_client()?;
            let provider =
                provider::build_provider(config.api_version, config.endpoints.clone(), http.clone());

            let outcome = Pipeline::new(&config, provider.as_ref())
                .run_with_s3(&credential, http, shutdown_signal())
                .await?;

            println!("key: [{}]", outcome.credential.access_key());
            println!(
                "secret: [{}]",
                outcome.credential.display_secret(config.reveal_secret)
            );
            println!("bucket: [{}] at [{}]", outcome.bucket, outcome.s3_endpoint);
            println!(
                "bucket created after {} attempt(s) in {:.2?}",
                outcome.creation.attempts, outcome.creation.elapsed
            );
            if outcome.deleted {
                println!("bucket deleted");
            }
            println!("completed at {}", outcome.completed_at.to_rfc3339());
        }
        Commands::DeleteBucket(args) => {
            let config = args.to_config();
            let bucket = BucketName::parse(&args.bucket)?;
            let credential = ServiceAccountCredential::new(&args.access_key, &args.secret);

            let client = S3BucketClient::new(
                config.http_client()?,
                config.s3_endpoint()?,
                &config.region,
                &credential,
                &bucket,
            )?;
            client
                .delete_bucket()
                .await
                .map_err(ProvisionError::FatalStorage)?;
            println!("bucket [{}] deleted", bucket);
        }
        Commands::Name {
            tag,
            length,
            region,
        } => {
            let prefix = ResourcePrefix::generate(&tag, length)?;
            let bucket = BucketName::derive(&prefix, &region)?;
            println!("prefix: {}", prefix);
            println!("bucket: {}", bucket);
        }
    }

    Ok(())
}

/// Completes on Ctrl-C; never completes if the handler cannot be installed.
async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        log::warn!("cannot listen for Ctrl-C: {}", e);
        std::future::pending::<()>().await;
    }
}
