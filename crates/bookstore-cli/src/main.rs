use anyhow::Context;
use bookstore_cli::admin::{AdminAccount, create_admin};
use bookstore_cli::seeder::{generate_books, insert_books};
use bookstore_db::{PgPool, init_db_pool, run_migrations};
use clap::{Parser, Subcommand};
use dialoguer::{Input, Password};
use dotenvy::dotenv;

#[derive(Parser)]
#[command(name = "bookstore-cli")]
#[command(about = "Bookstore CLI - Administrative tools for the bookstore backend", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create a new administrator account
    CreateAdmin {
        #[arg(short = 'u', long)]
        username: Option<String>,

        #[arg(short = 'e', long)]
        email: Option<String>,

        /// Password (will be prompted securely if not provided)
        #[arg(short = 'p', long)]
        password: Option<String>,

        #[arg(short = 'a', long)]
        address: Option<String>,

        #[arg(long, default_value = "30")]
        age: i32,
    },
    /// Seed the catalogue with fake books
    SeedBooks {
        /// Number of books to create
        #[arg(short = 'n', long, default_value = "50")]
        count: usize,
    },
    /// Apply pending database migrations
    Migrate,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv().ok();

    let database_url = std::env::var("DATABASE_URL").context("DATABASE_URL must be set")?;
    let pool = init_db_pool(&database_url, 5)
        .await
        .context("Failed to connect to database")?;

    let cli = Cli::parse();

    match cli.command {
        Commands::CreateAdmin {
            username,
            email,
            password,
            address,
            age,
        } => handle_create_admin(&pool, username, email, password, address, age).await,
        Commands::SeedBooks { count } => handle_seed_books(&pool, count).await,
        Commands::Migrate => {
            run_migrations(&pool).await?;
            println!("✅ Migrations applied");
            Ok(())
        }
    }
}

fn prompt_or(value: Option<String>, prompt: &str) -> anyhow::Result<String> {
    match value {
        Some(value) => Ok(value),
        None => Input::new()
            .with_prompt(prompt)
            .interact_text()
            .with_context(|| format!("Failed to read {}", prompt.to_lowercase())),
    }
}

async fn handle_create_admin(
    pool: &PgPool,
    username: Option<String>,
    email: Option<String>,
    password: Option<String>,
    address: Option<String>,
    age: i32,
) -> anyhow::Result<()> {
    let username = prompt_or(username, "Username")?;
    let email = prompt_or(email, "Email address")?;
    let address = prompt_or(address, "Address")?;
    let password = match password {
        Some(password) => password,
        None => Password::new()
            .with_prompt("Password")
            .with_confirmation("Confirm password", "Passwords don't match")
            .interact()
            .context("Failed to read password")?,
    };

    let account = AdminAccount {
        username,
        email,
        password,
        address,
        age,
    };
    let id = create_admin(pool, &account).await?;

    println!("\n✅ Admin created successfully!");
    println!("   Id: {}", id);
    println!("   Username: {}", account.username);
    println!("   Email: {}", account.email);
    Ok(())
}

async fn handle_seed_books(pool: &PgPool, count: usize) -> anyhow::Result<()> {
    let books = generate_books(count);
    let ids = insert_books(pool, &books).await?;
    println!("✅ Created {} books", ids.len());
    Ok(())
}
