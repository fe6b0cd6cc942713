use clap::Args;

#[derive(Args)]
pub struct CommonArgs {
    #[arg(long, env = "SENTRY_DSN", global = true)]
    pub sentry_dsn: Option<String>,
    #[arg(long, env = "SENTRY_ENVIRONMENT", global = true)]
    pub sentry_environment: Option<String>,
    #[arg(long, env = "SENTRY_SAMPLE_RATE", global = true)]
    pub sentry_sample_rate: Option<f32>,
    #[arg(long, env = "SENTRY_TRACES_SAMPLE_RATE", global = true)]
    pub sentry_traces_sample_rate: Option<f32>,
}
