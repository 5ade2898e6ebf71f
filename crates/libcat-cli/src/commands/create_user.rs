use clap::Parser;
use libcat_types::{claim::Role, config::BackendConfig, general::ValidEmail};
use tracing::info;

use crate::commands::{open_pool, Executor};

#[derive(Parser, Debug)]
pub struct CreateUserCmd {
    #[command(flatten)]
    backend: BackendConfig,
    #[arg(short, long, help = "User name")]
    name: String,
    #[arg(short, long, help = "User email, used as login")]
    pub email: ValidEmail,
    #[arg(short, long, help = "User password")]
    pub password: String,
    #[arg(short, long, num_args=0..,
        value_delimiter = ';', help = "Roles of the user, separated by ; or used multiple times, admin and trusted roles are supported")]
    pub roles: Vec<Role>,
}

impl Executor for CreateUserCmd {
    async fn run(self) -> anyhow::Result<()> {
        let pool = open_pool(&self.backend).await?;
        let repository = libcat_dal::user::UserRepository::new(pool);
        let roles: Vec<String> = self.roles.iter().map(|r| r.to_string()).collect();
        let new_user = libcat_dal::user::CreateUser {
            name: self.name,
            email: self.email,
            password: Some(self.password),
            roles: if roles.is_empty() { None } else { Some(roles) },
        };
        let user = repository.create(new_user).await?;
        info!("Created user {} with id {}", user.email, user.id);

        Ok(())
    }
}
