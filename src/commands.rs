//! Command execution.

use crate::{Commands, Operation};
use async_trait::async_trait;
use colored::Colorize;
use mexline_client::{ClientError, Config, MessageTagGenerator, NewsletterClient, QueryTransport};
use mexline_protocol::{extract_newsletter_metadata, BinaryNode, NewsletterJid};
use serde_json::Value;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::Mutex;

/// Executes a command and returns the formatted output.
pub async fn execute(cmd: Commands) -> Result<String, Box<dyn std::error::Error>> {
    match cmd {
        Commands::Envelope { op, jid } => {
            let envelope = render_envelope(op, &jid).await?;
            Ok(format_json(&serde_json::to_value(&envelope)?))
        }

        Commands::Extract { file, create } => {
            let metadata = extract_file(&file, create).await?;
            Ok(format_json(&serde_json::to_value(&metadata)?))
        }

        Commands::Config { config } => {
            let config = load_config(config)?;
            Ok(format_config(&config))
        }
    }
}

/// Transport that keeps the request it is handed and never answers.
struct DryRunTransport {
    tags: MessageTagGenerator,
    captured: Mutex<Option<BinaryNode>>,
}

impl DryRunTransport {
    fn new() -> Self {
        Self {
            tags: MessageTagGenerator::new(),
            captured: Mutex::new(None),
        }
    }

    async fn take(&self) -> Option<BinaryNode> {
        self.captured.lock().await.take()
    }
}

#[async_trait]
impl QueryTransport for DryRunTransport {
    async fn query(&self, node: BinaryNode) -> Result<BinaryNode, ClientError> {
        *self.captured.lock().await = Some(node);
        Err(ClientError::NotConnected)
    }

    fn generate_message_tag(&self) -> String {
        self.tags.next_tag()
    }
}

/// Runs `op` against a dry-run transport and returns the stanza it sent.
async fn render_envelope(
    op: Operation,
    jid: &NewsletterJid,
) -> Result<BinaryNode, Box<dyn std::error::Error>> {
    tracing::debug!("Rendering {:?} envelope for {}", op, jid);
    let transport = Arc::new(DryRunTransport::new());
    let client = NewsletterClient::new(transport.clone());

    // The dry run always fails after capturing the request
    let _ = match op {
        Operation::Follow => client.follow(jid).await.map(drop),
        Operation::Unfollow => client.unfollow(jid).await.map(drop),
        Operation::Mute => client.mute(jid).await.map(drop),
        Operation::Unmute => client.unmute(jid).await.map(drop),
        Operation::Delete => client.delete(jid).await.map(drop),
        Operation::Metadata => client.newsletter_metadata(jid).await.map(drop),
    };

    transport
        .take()
        .await
        .ok_or_else(|| format!("{:?} produced no request", op).into())
}

async fn extract_file(
    path: &Path,
    is_create: bool,
) -> Result<mexline_protocol::NewsletterMetadata, Box<dyn std::error::Error>> {
    let payload = tokio::fs::read_to_string(path)
        .await
        .map_err(|e| format!("failed to read '{}': {}", path.display(), e))?;

    let response = BinaryNode::new("iq")
        .with_attr("type", "result")
        .with_children(vec![BinaryNode::new("result").with_bytes(payload)]);

    Ok(extract_newsletter_metadata(&response, is_create)?)
}

fn load_config(path: Option<PathBuf>) -> Result<Config, Box<dyn std::error::Error>> {
    let config = match path {
        Some(path) => {
            let mut config = Config::from_file(path)?;
            config.apply_env_overrides()?;
            config
        }
        None => Config::load()?,
    };
    config.validate()?;
    Ok(config)
}

fn format_config(config: &Config) -> String {
    let auto_follow = &config.auto_follow;
    let status = if auto_follow.is_active() {
        "active".green()
    } else if auto_follow.enabled {
        "enabled, no newsletters".yellow()
    } else {
        "disabled".red()
    };

    let mut output = format!(
        "{}: {}\n{}: {}\n",
        "Auto-follow".bold(),
        status,
        "Event channel capacity".bold(),
        config.events.channel_capacity
    );

    if auto_follow.newsletters.is_empty() {
        output.push_str(&"No newsletters configured".dimmed().to_string());
    } else {
        output.push_str(&format!("{}:", "Newsletters".bold()));
        for jid in &auto_follow.newsletters {
            output.push_str(&format!("\n  {}", jid.as_str().cyan()));
        }
    }

    output
}

fn format_json(value: &Value) -> String {
    serde_json::to_string_pretty(value).unwrap_or_else(|_| value.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use mexline_protocol::QueryId;
    use std::io::Write;

    fn jid() -> NewsletterJid {
        NewsletterJid::parse("120363419833061999@newsletter").unwrap()
    }

    fn mex_payload(node: &BinaryNode) -> (String, Value) {
        let query = node.get_child("query").unwrap();
        let body = query.content_str().unwrap().unwrap();
        (
            query.attr("query_id").unwrap().to_string(),
            serde_json::from_str(body).unwrap(),
        )
    }

    #[tokio::test]
    async fn test_envelope_for_mutations() {
        let cases = [
            (Operation::Follow, QueryId::Follow),
            (Operation::Unfollow, QueryId::Unfollow),
            (Operation::Mute, QueryId::Mute),
            (Operation::Unmute, QueryId::Unmute),
            (Operation::Delete, QueryId::Delete),
        ];

        for (op, query_id) in cases {
            let node = render_envelope(op, &jid()).await.unwrap();
            assert_eq!(node.tag, "iq");
            assert_eq!(node.attr("xmlns"), Some("w:mex"));
            assert!(node.attr("id").unwrap().ends_with(".1"));

            let (sent_id, body) = mex_payload(&node);
            assert_eq!(sent_id, query_id.as_str());
            assert_eq!(
                body["variables"]["newsletter_id"],
                "120363419833061999@newsletter"
            );
        }
    }

    #[tokio::test]
    async fn test_envelope_for_metadata() {
        let node = render_envelope(Operation::Metadata, &jid()).await.unwrap();
        let (sent_id, body) = mex_payload(&node);

        assert_eq!(sent_id, QueryId::Metadata.as_str());
        assert_eq!(body["variables"]["fetch_viewer_metadata"], true);
        assert_eq!(body["variables"]["input"]["view_role"], "GUEST");
    }

    #[tokio::test]
    async fn test_extract_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"{{"data":{{"xwa2_newsletter_create":{{"id":"9@newsletter","state":{{"type":"ACTIVE"}}}}}}}}"#
        )
        .unwrap();

        let metadata = extract_file(file.path(), true).await.unwrap();
        assert_eq!(metadata.id.as_deref(), Some("9@newsletter"));

        let err = extract_file(file.path(), false).await.unwrap_err();
        assert!(err.to_string().contains("xwa2_newsletter"));
    }

    #[tokio::test]
    async fn test_extract_missing_file() {
        let err = extract_file(Path::new("/nonexistent/payload.json"), false)
            .await
            .unwrap_err();
        assert!(err.to_string().contains("failed to read"));
    }

    #[test]
    fn test_format_config() {
        colored::control::set_override(false);

        let mut config = Config::default();
        assert!(format_config(&config).contains("enabled, no newsletters"));

        config.auto_follow.newsletters = vec![jid()];
        let output = format_config(&config);
        assert!(output.contains("Auto-follow: active"));
        assert!(output.contains("120363419833061999@newsletter"));
    }
}
