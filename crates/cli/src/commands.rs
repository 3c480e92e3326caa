//! CLI commands

use anyhow::{Context, Result, bail};
use autores_client::{ApiGateway, Author, ClientError, NewUser};
use clap::Subcommand;
use std::io::{BufRead, Write};
use std::path::PathBuf;
use tracing::{info, warn};

use crate::config::{self, Settings};

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Log in and keep the session token for later commands
    Login {
        /// Account email
        #[arg(long)]
        email: String,

        /// Account password
        #[arg(long, env = "AUTORES_PASSWORD", hide_env_values = true)]
        password: String,
    },

    /// Forget the stored session
    Logout,

    /// Create a user account
    Register {
        #[arg(long)]
        first_name: String,

        #[arg(long)]
        last_name: String,

        #[arg(long)]
        email: String,

        #[arg(long, env = "AUTORES_PASSWORD", hide_env_values = true)]
        password: String,
    },

    /// Show whether a session is stored
    Status,

    /// Browse and manage authors
    Authors {
        #[command(subcommand)]
        command: AuthorCommands,
    },

    /// Configuration file operations
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },
}

#[derive(Debug, Subcommand)]
pub enum AuthorCommands {
    /// List all authors
    List,

    /// Show one author (requires login)
    Show {
        /// Author identifier
        id: String,
    },

    /// Delete an author (requires login)
    Delete {
        /// Author identifier
        id: String,

        /// Do not ask for confirmation
        #[arg(short, long)]
        yes: bool,
    },
}

#[derive(Debug, Subcommand)]
pub enum ConfigCommands {
    /// Write a configuration file with the default settings
    Init {
        /// Output file path (defaults to the platform config directory)
        output: Option<PathBuf>,

        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },

    /// Print the effective settings
    Show,
}

impl Commands {
    pub async fn execute(self, gateway: &ApiGateway, settings: &Settings) -> Result<()> {
        match self {
            Self::Login { email, password } => {
                let login = gateway
                    .login(&email, &password)
                    .await
                    .map_err(user_facing)?;
                println!("Welcome {}!", login.user.first_name);
                refresh_authors(gateway).await;
                Ok(())
            }
            Self::Logout => {
                gateway.logout().map_err(user_facing)?;
                println!("Signed out.");
                Ok(())
            }
            Self::Register {
                first_name,
                last_name,
                email,
                password,
            } => {
                let user = NewUser {
                    first_name,
                    last_name,
                    email,
                    password,
                };
                gateway.register(&user).await.map_err(user_facing)?;
                println!("User created. You can now log in.");
                Ok(())
            }
            Self::Status => {
                if gateway.is_authenticated().map_err(user_facing)? {
                    println!("Logged in ({})", settings.session_path().display());
                } else {
                    println!("Not logged in.");
                }
                Ok(())
            }
            Self::Authors { command } => {
                let stdin = std::io::stdin();
                command.execute(gateway, &mut stdin.lock()).await
            }
            Self::Config { command } => command.execute(settings),
        }
    }
}

impl AuthorCommands {
    pub async fn execute(self, gateway: &ApiGateway, input: &mut impl BufRead) -> Result<()> {
        match self {
            Self::List => {
                let authors = gateway.list_authors().await.map_err(user_facing)?;
                print_authors(&authors);
                Ok(())
            }
            Self::Show { id } => {
                require_session(gateway)?;
                let author = gateway.get_author(&id).await.map_err(user_facing)?;
                println!("{}", render_author_detail(&author));
                Ok(())
            }
            Self::Delete { id, yes } => {
                require_session(gateway)?;
                let prompt = format!("Delete author {id}? [y/N] ");
                if !yes && !confirm(&prompt, input)? {
                    println!("Cancelled.");
                    return Ok(());
                }
                gateway.delete_author(&id).await.map_err(user_facing)?;
                info!(author_id = %id, "Author deleted");
                println!("Author deleted.");
                refresh_authors(gateway).await;
                Ok(())
            }
        }
    }
}

impl ConfigCommands {
    pub fn execute(self, settings: &Settings) -> Result<()> {
        match self {
            Self::Init { output, force } => {
                let config_path = output.unwrap_or_else(config::default_config_path);

                if config_path.exists() && !force {
                    bail!(
                        "{} already exists (use --force to overwrite)",
                        config_path.display()
                    );
                }

                // Create parent directory if it doesn't exist
                if let Some(parent) = config_path.parent().filter(|p| !p.as_os_str().is_empty()) {
                    std::fs::create_dir_all(parent)
                        .with_context(|| format!("Failed to create {}", parent.display()))?;
                }

                let content = Settings::default().to_toml()?;
                std::fs::write(&config_path, content)
                    .with_context(|| format!("Failed to write {}", config_path.display()))?;
                println!("Generated configuration at: {}", config_path.display());
                Ok(())
            }
            Self::Show => {
                print!("{}", settings.to_toml()?);
                Ok(())
            }
        }
    }
}

/// Refuse protected commands when no session is stored
fn require_session(gateway: &ApiGateway) -> Result<()> {
    if gateway.is_authenticated().map_err(user_facing)? {
        Ok(())
    } else {
        bail!("Access denied. You must log in.")
    }
}

fn print_authors(authors: &[Author]) {
    if authors.is_empty() {
        println!("No authors found.");
    }
    for author in authors {
        println!("{}", render_author_line(author));
    }
}

/// Show the current listing after a change. The change itself already
/// succeeded, so a failed listing is only logged.
async fn refresh_authors(gateway: &ApiGateway) {
    match gateway.list_authors().await {
        Ok(authors) => print_authors(&authors),
        Err(err) => warn!("Could not refresh the author list: {}", err.user_message()),
    }
}

/// Wrap a client error so its top-level message is the server's reason
fn user_facing(err: ClientError) -> anyhow::Error {
    let message = err.user_message();
    anyhow::Error::new(err).context(message)
}

/// Ask a yes/no question, defaulting to no
fn confirm(prompt: &str, input: &mut impl BufRead) -> Result<bool> {
    print!("{prompt}");
    std::io::stdout().flush()?;

    let mut answer = String::new();
    input.read_line(&mut answer)?;
    Ok(matches!(
        answer.trim().to_lowercase().as_str(),
        "y" | "yes" | "s" | "si" | "sí"
    ))
}

fn render_author_line(author: &Author) -> String {
    format!(
        "[{}] {} - {}",
        author.id,
        author.full_name(),
        author.biography.as_deref().unwrap_or("N/A")
    )
}

fn render_author_detail(author: &Author) -> String {
    format!(
        "ID: {}\nName: {}\nBiography: {}",
        author.id,
        author.full_name(),
        author.biography.as_deref().unwrap_or("N/A")
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session_file::FileSessionStore;
    use autores_client::{MemorySessionStore, SessionStore};
    use serde_json::json;
    use std::io::Cursor;
    use std::sync::Arc;
    use wiremock::matchers::{body_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn author(biography: Option<&str>) -> Author {
        Author {
            id: "42".into(),
            first_name: "Isabel".into(),
            last_name: "Allende".into(),
            biography: biography.map(str::to_string),
        }
    }

    #[test]
    fn test_render_author_line() {
        assert_eq!(
            render_author_line(&author(Some("Novelista chilena"))),
            "[42] Isabel Allende - Novelista chilena"
        );
        assert_eq!(render_author_line(&author(None)), "[42] Isabel Allende - N/A");
    }

    #[test]
    fn test_render_author_detail() {
        assert_eq!(
            render_author_detail(&author(None)),
            "ID: 42\nName: Isabel Allende\nBiography: N/A"
        );
    }

    #[test]
    fn test_confirm_answers() {
        assert!(confirm("? ", &mut Cursor::new("y\n")).unwrap());
        assert!(confirm("? ", &mut Cursor::new("YES\n")).unwrap());
        assert!(confirm("? ", &mut Cursor::new("sí\n")).unwrap());
        assert!(!confirm("? ", &mut Cursor::new("n\n")).unwrap());
        assert!(!confirm("? ", &mut Cursor::new("")).unwrap());
    }

    #[tokio::test]
    async fn test_protected_commands_require_session() {
        // Unroutable origin: the guard must fail before any request is made
        let gateway = ApiGateway::builder()
            .base_url("http://127.0.0.1:9/api")
            .session_store(Arc::new(MemorySessionStore::new()))
            .build()
            .unwrap();

        let err = AuthorCommands::Delete {
            id: "42".into(),
            yes: true,
        }
        .execute(&gateway, &mut Cursor::new(""))
        .await
        .unwrap_err();
        assert_eq!(err.to_string(), "Access denied. You must log in.");

        let err = AuthorCommands::Show { id: "42".into() }
            .execute(&gateway, &mut Cursor::new(""))
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "Access denied. You must log in.");
    }

    #[tokio::test]
    async fn test_declined_delete_sends_nothing() {
        let gateway = ApiGateway::builder()
            .base_url("http://127.0.0.1:9/api")
            .session_store(Arc::new(MemorySessionStore::with_token("abc123")))
            .build()
            .unwrap();

        AuthorCommands::Delete {
            id: "42".into(),
            yes: false,
        }
        .execute(&gateway, &mut Cursor::new("n\n"))
        .await
        .unwrap();
    }

    #[test]
    fn test_user_facing_keeps_reason_on_top() {
        let err = user_facing(ClientError::NotFound("Autor no encontrado".into()));
        assert_eq!(err.to_string(), "Autor no encontrado");
        assert!(err.downcast_ref::<ClientError>().is_some());
    }

    #[test]
    fn test_config_init_refuses_to_overwrite() {
        let temp_dir = tempfile::TempDir::new().unwrap();
        let path = temp_dir.path().join("autores.toml");

        ConfigCommands::Init {
            output: Some(path.clone()),
            force: false,
        }
        .execute(&Settings::default())
        .unwrap();
        assert!(path.exists());

        let again = ConfigCommands::Init {
            output: Some(path.clone()),
            force: false,
        }
        .execute(&Settings::default());
        assert!(again.is_err());

        ConfigCommands::Init {
            output: Some(path),
            force: true,
        }
        .execute(&Settings::default())
        .unwrap();
    }

    #[tokio::test]
    async fn test_login_persists_session_and_lists_authors() {
        let mock_server = MockServer::start().await;
        let temp_dir = tempfile::TempDir::new().unwrap();
        let session_path = temp_dir.path().join("session.json");

        Mock::given(method("POST"))
            .and(path("/api/usuarios/login"))
            .and(body_json(json!({"email": "ana@example.com", "password": "secret"})))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "status": true,
                "token": "jwt-token",
                "user": {"first_name": "Ana"}
            })))
            .expect(1)
            .mount(&mock_server)
            .await;
        Mock::given(method("GET"))
            .and(path("/api/autores"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"data": []})))
            .expect(1)
            .mount(&mock_server)
            .await;

        let mut settings = Settings::default();
        settings.api.base_url = format!("{}/api", mock_server.uri());
        settings.session.path = Some(session_path.clone());
        let gateway = ApiGateway::builder()
            .base_url(settings.api.base_url.clone())
            .session_store(Arc::new(FileSessionStore::new(&session_path)))
            .build()
            .unwrap();

        Commands::Login {
            email: "ana@example.com".into(),
            password: "secret".into(),
        }
        .execute(&gateway, &settings)
        .await
        .unwrap();

        // A later invocation reads the token back from disk
        let reopened = FileSessionStore::new(&session_path);
        assert_eq!(reopened.get().unwrap().as_deref(), Some("jwt-token"));
        assert!(gateway.is_authenticated().unwrap());
        Commands::Status.execute(&gateway, &settings).await.unwrap();

        let requests = mock_server.received_requests().await.unwrap();
        let listing = requests
            .iter()
            .find(|request| request.url.path() == "/api/autores")
            .unwrap();
        assert_eq!(listing.headers.get("x-token").unwrap(), "jwt-token");
    }

    #[tokio::test]
    async fn test_failed_refresh_does_not_fail_delete() {
        let mock_server = MockServer::start().await;

        Mock::given(method("DELETE"))
            .and(path("/api/autores/42"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"message": "ok"})))
            .expect(1)
            .mount(&mock_server)
            .await;
        Mock::given(method("GET"))
            .and(path("/api/autores"))
            .respond_with(ResponseTemplate::new(500))
            .expect(1)
            .mount(&mock_server)
            .await;

        let gateway = ApiGateway::builder()
            .base_url(format!("{}/api", mock_server.uri()))
            .session_store(Arc::new(MemorySessionStore::with_token("jwt-token")))
            .build()
            .unwrap();

        AuthorCommands::Delete {
            id: "42".into(),
            yes: true,
        }
        .execute(&gateway, &mut Cursor::new(""))
        .await
        .unwrap();
    }
}
