//! SchoolHub CLI
//!
//! Command-line client for the SchoolHub API:
//! - Sign in and print a session token
//! - Review and approve accounts
//! - Browse and export admission leads
//! - Check server status
//! - Generate a config file

use anyhow::{bail, Context};
use clap::{Parser, Subcommand};
use reqwest::{Client, RequestBuilder, Response};
use serde_json::{json, Value};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "schoolhub-cli")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Command-line client for the SchoolHub API")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// API server URL
    #[arg(long, default_value = "http://localhost:8090", global = true)]
    pub api_url: String,

    /// Session token from `schoolhub-cli login`
    #[arg(long, env = "SCHOOLHUB_TOKEN", global = true, hide_env_values = true)]
    pub token: Option<String>,

    /// Output format (table, json)
    #[arg(short, long, default_value = "table", global = true)]
    pub format: String,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Sign in and print a session token
    Login {
        /// Account email
        #[arg(short, long)]
        email: String,
        /// Account password
        #[arg(short, long, env = "SCHOOLHUB_PASSWORD", hide_env_values = true)]
        password: String,
        /// Use the administrator login
        #[arg(long)]
        admin: bool,
    },

    /// Show the signed-in account
    Whoami,

    /// Show server status
    Status,

    /// List accounts
    Users {
        /// Match name or email
        #[arg(short, long)]
        search: Option<String>,
        /// admin, staff, student or all
        #[arg(short, long)]
        role: Option<String>,
        /// Only accounts waiting for approval
        #[arg(long)]
        pending: bool,
        /// Page number
        #[arg(long, default_value = "1")]
        page: usize,
    },

    /// Approve a pending account
    Approve {
        /// User ID
        id: String,
    },

    /// List admission leads
    Leads {
        /// Match name, number, class or parents
        #[arg(short, long)]
        search: Option<String>,
        /// Admitted, Not Admitted or Canceled
        #[arg(long)]
        status: Option<String>,
        /// Page number
        #[arg(long, default_value = "1")]
        page: usize,
    },

    /// Export leads as CSV
    ExportLeads {
        /// Status filter
        #[arg(long)]
        status: Option<String>,
        /// Output file (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Export accounts as CSV
    ExportUsers {
        /// Role filter
        #[arg(short, long)]
        role: Option<String>,
        /// Output file (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Generate default config file
    Config {
        /// Output path (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let api = ApiClient::new(&cli.api_url, cli.token.clone());

    match cli.command {
        Commands::Login {
            email,
            password,
            admin,
        } => {
            let path = if admin { "/api/v1/auth/admin-login" } else { "/api/v1/auth/login" };
            let session = api
                .send(
                    api.post(path)
                        .json(&json!({"email": email, "password": password})),
                )
                .await?;

            if cli.format == "json" {
                println!("{}", serde_json::to_string_pretty(&session)?);
            } else {
                let user = &session["user"];
                eprintln!(
                    "Signed in as {} ({}), session expires {}",
                    text(&user["name"]),
                    text(&user["role"]),
                    text(&session["expires_at"])
                );
                if user["verified"] == Value::Bool(false) {
                    eprintln!("Account is waiting for administrator approval");
                }
                eprintln!("Export the token to use it:");
                println!("export SCHOOLHUB_TOKEN={}", text(&session["token"]));
            }
        }

        Commands::Whoami => {
            let me = api.send(api.get("/api/v1/auth/me")?).await?;
            let user = &me["user"];
            println!("Name:     {}", text(&user["name"]));
            println!("Email:    {}", text(&user["email"]));
            println!("Role:     {}", text(&user["role"]));
            println!("Verified: {}", user["verified"].as_bool().unwrap_or(false));
            println!("Session:  expires {}", text(&me["expires_at"]));
        }

        Commands::Status => {
            let response = api.client.get(api.url("/health")).send().await;
            match response {
                Ok(resp) if resp.status().is_success() => {
                    let health: Value = resp.json().await?;
                    println!("SchoolHub v{}", text(&health["version"]));
                    println!();
                    println!("API Status: {}", text(&health["status"]));
                    println!("Database:   {}", text(&health["database"]));
                    println!("Uploads:    {}", text(&health["uploads"]));
                    if let Some(uptime) = health["uptime_seconds"].as_u64() {
                        println!();
                        println!("Uptime: {}", format_duration(uptime));
                    }
                }
                Ok(resp) => bail!("API returned error: {}", resp.status()),
                Err(e) => {
                    eprintln!("Cannot connect to SchoolHub API at {}", cli.api_url);
                    eprintln!();
                    eprintln!("Make sure the server is running:");
                    eprintln!("  cargo run --bin schoolhub");
                    return Err(e.into());
                }
            }
        }

        Commands::Users {
            search,
            role,
            pending,
            page,
        } => {
            let mut query = vec![("page", page.to_string())];
            push_opt(&mut query, "search", search);
            push_opt(&mut query, "role", role);
            if pending {
                query.push(("verified", "false".to_string()));
            }

            let result = api.send(api.get("/api/v1/users")?.query(&query)).await?;
            if cli.format == "json" {
                println!("{}", serde_json::to_string_pretty(&result)?);
            } else {
                print_users(&result);
            }
        }

        Commands::Approve { id } => {
            let user = api
                .send(api.authed(api.post(&format!("/api/v1/users/{}/approve", id)))?)
                .await?;
            println!("Approved {} <{}>", text(&user["name"]), text(&user["email"]));
        }

        Commands::Leads {
            search,
            status,
            page,
        } => {
            let mut query = vec![("page", page.to_string())];
            push_opt(&mut query, "search", search);
            push_opt(&mut query, "status", status);

            let result = api.send(api.get("/api/v1/leads")?.query(&query)).await?;
            if cli.format == "json" {
                println!("{}", serde_json::to_string_pretty(&result)?);
            } else {
                print_leads(&result);
            }
        }

        Commands::ExportLeads { status, output } => {
            let mut query = Vec::new();
            push_opt(&mut query, "status", status);
            let csv = api
                .send_text(api.get("/api/v1/leads/export")?.query(&query))
                .await?;
            write_output(output, &csv)?;
        }

        Commands::ExportUsers { role, output } => {
            let mut query = Vec::new();
            push_opt(&mut query, "role", role);
            let csv = api
                .send_text(api.get("/api/v1/users/export")?.query(&query))
                .await?;
            write_output(output, &csv)?;
        }

        Commands::Config { output } => {
            let config = schoolhub::config::generate_default_config();
            write_output(output, &config)?;
        }
    }

    Ok(())
}

/// Thin wrapper that knows the base URL and the session token
struct ApiClient {
    client: Client,
    base_url: String,
    token: Option<String>,
}

impl ApiClient {
    fn new(base_url: &str, token: Option<String>) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            token: token.filter(|t| !t.trim().is_empty()),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn post(&self, path: &str) -> RequestBuilder {
        self.client.post(self.url(path))
    }

    /// Authenticated GET
    fn get(&self, path: &str) -> anyhow::Result<RequestBuilder> {
        self.authed(self.client.get(self.url(path)))
    }

    fn authed(&self, request: RequestBuilder) -> anyhow::Result<RequestBuilder> {
        match &self.token {
            Some(token) => Ok(request.bearer_auth(token)),
            None => bail!("Not signed in. Run `schoolhub-cli login` and export SCHOOLHUB_TOKEN"),
        }
    }

    async fn send(&self, request: RequestBuilder) -> anyhow::Result<Value> {
        let response = self.checked(request).await?;
        if response.status() == reqwest::StatusCode::NO_CONTENT {
            return Ok(Value::Null);
        }
        response.json().await.context("decoding response")
    }

    async fn send_text(&self, request: RequestBuilder) -> anyhow::Result<String> {
        Ok(self.checked(request).await?.text().await?)
    }

    /// Turn error bodies into a readable message
    async fn checked(&self, request: RequestBuilder) -> anyhow::Result<Response> {
        let response = request
            .send()
            .await
            .with_context(|| format!("cannot reach {}", self.base_url))?;
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        let message = serde_json::from_str::<Value>(&body)
            .ok()
            .and_then(|v| v["error"]["message"].as_str().map(str::to_string))
            .unwrap_or(body);
        bail!("Request failed ({}): {}", status, message)
    }
}

fn push_opt(query: &mut Vec<(&'static str, String)>, key: &'static str, value: Option<String>) {
    if let Some(value) = value {
        query.push((key, value));
    }
}

fn text(value: &Value) -> &str {
    match value.as_str() {
        Some(s) if !s.is_empty() => s,
        _ => "-",
    }
}

fn write_output(output: Option<PathBuf>, content: &str) -> anyhow::Result<()> {
    match output {
        Some(path) => {
            if let Some(parent) = path.parent() {
                std::fs::create_dir_all(parent)?;
            }
            std::fs::write(&path, content)
                .with_context(|| format!("writing {:?}", path))?;
            eprintln!("Written to {:?}", path);
        }
        None => print!("{}", content),
    }
    Ok(())
}

fn format_duration(seconds: u64) -> String {
    if seconds < 60 {
        format!("{}s", seconds)
    } else if seconds < 3600 {
        format!("{}m {}s", seconds / 60, seconds % 60)
    } else if seconds < 86400 {
        format!("{}h {}m", seconds / 3600, (seconds % 3600) / 60)
    } else {
        format!("{}d {}h", seconds / 86400, (seconds % 86400) / 3600)
    }
}

fn print_page_footer(page: &Value) {
    println!();
    println!(
        "Page {} of {} ({} total)",
        page["page"].as_u64().unwrap_or(1),
        page["total_pages"].as_u64().unwrap_or(1),
        page["total"].as_u64().unwrap_or(0)
    );
}

fn print_users(page: &Value) {
    let users = page["items"].as_array().map(Vec::as_slice).unwrap_or(&[]);
    if users.is_empty() {
        println!("No accounts match");
        return;
    }

    println!(
        "{:<36}  {:<24} {:<30} {:<8} {}",
        "ID", "Name", "Email", "Role", "Verified"
    );
    println!("{}", "-".repeat(110));
    for user in users {
        println!(
            "{:<36}  {:<24} {:<30} {:<8} {}",
            text(&user["id"]),
            text(&user["name"]),
            text(&user["email"]),
            text(&user["role"]),
            if user["verified"].as_bool().unwrap_or(false) { "yes" } else { "pending" }
        );
    }
    print_page_footer(page);
}

fn print_leads(result: &Value) {
    let stats = &result["stats"];
    let status = &stats["status_breakdown"];
    println!(
        "{} leads: {} admitted ({}%), {} not admitted, {} canceled",
        stats["total_leads"].as_u64().unwrap_or(0),
        status["admitted"].as_u64().unwrap_or(0),
        text(&status["admitted_percentage"]),
        status["not_admitted"].as_u64().unwrap_or(0),
        status["canceled"].as_u64().unwrap_or(0)
    );
    println!();

    let page = &result["leads"];
    let leads = page["items"].as_array().map(Vec::as_slice).unwrap_or(&[]);
    if leads.is_empty() {
        println!("No leads match");
        return;
    }

    println!("{:<24} {:<14} {:<14} {:<12}", "Name", "Number", "Status", "Class");
    println!("{}", "-".repeat(66));
    for lead in leads {
        println!(
            "{:<24} {:<14} {:<14} {:<12}",
            text(&lead["name"]),
            text(&lead["number"]),
            text(&lead["status"]),
            text(&lead["class"])
        );
    }
    print_page_footer(page);
}
