use std::time::Duration;

use async_trait::async_trait;
use serde::Serialize;

use crate::application::{AppError, AppResult, Notifier};
use crate::domain::{RaidMessage, WebhookUrl};

const EMBED_COLOR: u32 = 0x00A8_FC;

pub struct DiscordNotifier {
    client: reqwest::Client,
    webhook: WebhookUrl,
}

impl DiscordNotifier {
    pub fn new(webhook: WebhookUrl, timeout: Duration) -> AppResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| AppError::Config(e.to_string()))?;
        Ok(Self { client, webhook })
    }
}

#[derive(Debug, Serialize)]
struct WebhookBody<'a> {
    embeds: [Embed<'a>; 1],
}

#[derive(Debug, Serialize)]
struct Embed<'a> {
    title: &'a str,
    color: u32,
    author: EmbedAuthor<'a>,
    thumbnail: EmbedImage<'a>,
    fields: Vec<EmbedField>,
    footer: EmbedFooter,
}

#[derive(Debug, Serialize)]
struct EmbedAuthor<'a> {
    name: &'a str,
}

#[derive(Debug, Serialize)]
struct EmbedImage<'a> {
    url: &'a str,
}

#[derive(Debug, Serialize)]
struct EmbedField {
    name: String,
    value: String,
    inline: bool,
}

#[derive(Debug, Serialize)]
struct EmbedFooter {
    text: String,
}

fn build_embed(message: &RaidMessage) -> Embed<'_> {
    let mut fields: Vec<EmbedField> = message
        .players
        .iter()
        .enumerate()
        .map(|(i, player)| EmbedField {
            name: format!("Player {}", i + 1),
            value: player.clone(),
            inline: true,
        })
        .collect();

    if let Some(gxp) = &message.gxp_gained {
        fields.push(EmbedField {
            name: "Guild XP".to_string(),
            value: gxp.clone(),
            inline: true,
        });
    }
    if let Some(sr) = message.sr_gained {
        fields.push(EmbedField {
            name: "Seasonal Rating".to_string(),
            value: sr.to_string(),
            inline: true,
        });
    }

    Embed {
        title: &message.title,
        color: EMBED_COLOR,
        author: EmbedAuthor {
            name: &message.guild,
        },
        thumbnail: EmbedImage {
            url: &message.thumbnail_url,
        },
        fields,
        footer: EmbedFooter {
            text: format!("Reported by {}", message.reporter_uuid),
        },
    }
}

#[async_trait]
impl Notifier for DiscordNotifier {
    async fn notify(&self, message: &RaidMessage) -> AppResult<()> {
        let payload = WebhookBody {
            embeds: [build_embed(message)],
        };

        self.client
            .post(self.webhook.as_str())
            .header("Content-Type", "application/json")
            .json(&payload)
            .send()
            .await
            .map_err(|e| AppError::Notifier(e.without_url().to_string()))?
            .error_for_status()
            .map_err(|e| AppError::Notifier(e.without_url().to_string()))?;

        Ok(())
    }
}
