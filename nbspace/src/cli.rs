use clap::{Parser, Subcommand};

/// nbspace - prepare request-scoped notebook containers
#[derive(Parser, Debug)]
#[command(name = "nbspace")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Place container, notebook, store and dependency roots under this
    /// directory instead of the NBSPACE_* environment values
    #[arg(long, global = true, value_name = "DIR")]
    pub root: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Generate the build context and stage notebook content for one request
    Prepare {
        /// Stored notebook name
        #[arg(long)]
        name: String,

        /// Stored notebook version
        #[arg(long)]
        version: String,

        /// Request id; namespaces every generated path
        #[arg(long)]
        request_id: String,

        /// Obscured notebook token (see `encode-token`)
        #[arg(long, env = "NBSPACE_TOKEN", hide_env_values = true)]
        token: String,

        /// Read-only environment without host identity mapping
        #[arg(long, default_value = "false")]
        view: bool,

        /// Print the result as JSON
        #[arg(long, default_value = "false")]
        json: bool,
    },

    /// Print the build and content directories a request would use
    Layout {
        #[arg(long)]
        name: String,

        #[arg(long)]
        version: String,

        #[arg(long)]
        request_id: String,
    },

    /// Check that docker and docker-compose are installed (exit code 1 if not)
    Verify,

    /// Obscure a plaintext token with NBSPACE_TOKEN_SECRET
    EncodeToken {
        /// Plaintext token
        #[arg(value_name = "TOKEN")]
        token: String,
    },
}
