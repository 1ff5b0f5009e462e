use clap::Parser;

/// Send one chat completion to an Azure OpenAI deployment and report the reply.
#[derive(Debug, Clone, Default, Parser)]
#[command(author, version, about = "Test Azure OpenAI API connectivity", long_about = None)]
pub struct Cli {
    /// Azure OpenAI endpoint (https://<name>.openai.azure.com)
    #[arg(long)]
    pub endpoint: Option<String>,
    /// Azure OpenAI API key
    #[arg(long)]
    pub key: Option<String>,
    /// Deployment name (model deployment)
    #[arg(long)]
    pub deployment: Option<String>,
    /// REST API version appended as `api-version`
    #[arg(long)]
    pub api_version: Option<String>,
    /// Request timeout in seconds
    #[arg(long)]
    pub timeout_secs: Option<u64>,
    /// Print the outgoing request and the full JSON response
    #[arg(long)]
    pub verbose: bool,
}
