#[derive(clap::Parser, Clone, Debug)]
pub struct Config {
    /// Not needed by `read-time`.
    #[clap(long, env)]
    pub database_url: Option<String>,

    #[clap(long, env, default_value_t = 50)]
    pub database_max_connections: u32,

    /// Sender address of outgoing notifications.
    #[clap(long, env, default_value = "noreply@blog.local")]
    pub default_from_email: String,
}
