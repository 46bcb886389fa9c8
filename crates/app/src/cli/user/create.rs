use clap::Args;
use storefront_app::{
    auth::{generate_token, hash_token},
    database::{self, Db},
    domain::users::{
        PgUsersService, UsersService,
        data::NewUser,
        records::{Role, UserUuid},
    },
};

#[derive(Debug, Args)]
pub(crate) struct CreateUserArgs {
    /// PostgreSQL connection string
    #[arg(long, env = "DATABASE_URL", hide_env_values = true)]
    database_url: String,

    /// Login email for the new user
    #[arg(long)]
    email: String,

    /// `admin` or `user`
    #[arg(long, default_value = "user")]
    role: Role,
}

pub(crate) async fn run(args: CreateUserArgs) -> Result<(), String> {
    let email = args.email.trim().to_string();

    if email.is_empty() {
        return Err("email cannot be empty".to_string());
    }

    let pool = database::connect(&args.database_url)
        .await
        .map_err(|error| format!("failed to connect to database: {error}"))?;

    let service = PgUsersService::new(Db::new(pool));
    let token = generate_token();

    let user = service
        .register(NewUser {
            uuid: UserUuid::new(),
            email,
            role: args.role,
            token_hash: hash_token(&token),
        })
        .await
        .map_err(|error| format!("failed to create user: {error}"))?;

    println!("user_uuid: {}", user.uuid);
    println!("user_email: {}", user.email);
    println!("user_role: {}", user.role);
    println!("api_token: {token}");
    println!("store this token now; it is only shown once");

    Ok(())
}
