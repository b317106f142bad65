use std::collections::{HashMap, HashSet};
use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{ACCEPT, USER_AGENT};
use serde::Deserialize;
use serde_json::Value;

use crate::application::{AppError, AppResult, GuildSource, PlayerInfo, PlayerLookup};

pub const DEFAULT_API_BASE: &str = "https://api.wynncraft.com/v3";

pub struct WynncraftClient {
    client: reqwest::Client,
    api_base: String,
}

impl WynncraftClient {
    pub fn new(api_base: impl Into<String>, timeout: Duration) -> AppResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| AppError::Config(e.to_string()))?;
        Ok(Self {
            client,
            api_base: api_base.into().trim_end_matches('/').to_string(),
        })
    }

    async fn get_json<T: serde::de::DeserializeOwned>(&self, url: String) -> AppResult<T> {
        self.client
            .get(url)
            .header(USER_AGENT, "raidrelay")
            .header(ACCEPT, "application/json")
            .send()
            .await
            .map_err(|e| AppError::Upstream(e.to_string()))?
            .error_for_status()
            .map_err(|e| AppError::Upstream(e.to_string()))?
            .json()
            .await
            .map_err(|e| AppError::Upstream(e.to_string()))
    }
}

#[derive(Debug, Deserialize)]
struct GuildResp {
    members: HashMap<String, Value>, // rank -> { username -> { uuid, .. } }, plus "total"
}

#[derive(Debug, Deserialize)]
struct MemberResp {
    uuid: Option<String>,
}

#[derive(Debug, Deserialize)]
struct PlayerResp {
    username: String,
    guild: Option<PlayerGuildResp>,
}

#[derive(Debug, Deserialize)]
struct PlayerGuildResp {
    name: String,
}

fn flatten_members(resp: GuildResp) -> HashSet<String> {
    resp.members
        .into_values()
        .filter_map(|rank| match rank {
            Value::Object(members) => Some(members),
            _ => None,
        })
        .flat_map(|members| members.into_values())
        .filter_map(|m| serde_json::from_value::<MemberResp>(m).ok()?.uuid)
        .collect()
}

#[async_trait]
impl GuildSource for WynncraftClient {
    async fn fetch_guild_members(&self, guild: &str) -> AppResult<HashSet<String>> {
        let url = format!("{}/guild/{}", self.api_base, guild);
        let body: GuildResp = self.get_json(url).await?;
        Ok(flatten_members(body))
    }
}

#[async_trait]
impl PlayerLookup for WynncraftClient {
    async fn fetch_player_info(&self, uuid: &str) -> AppResult<PlayerInfo> {
        let url = format!("{}/player/{}", self.api_base, uuid);
        let body: PlayerResp = self.get_json(url).await?;
        Ok(PlayerInfo {
            name: body.username,
            guild: body.guild.map(|g| g.name),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flattens_every_rank_and_skips_total() {
        let raw = r#"{
            "name": "Example Guild",
            "members": {
                "total": 3,
                "owner": { "Alice": { "uuid": "u-alice", "online": false } },
                "chief": { "Bob": { "uuid": "u-bob" } },
                "recruit": { "Carol": { "uuid": "u-carol" }, "Ghost": { "online": true } }
            }
        }"#;
        let resp: GuildResp = serde_json::from_str(raw).unwrap();
        let members = flatten_members(resp);
        let expected: HashSet<String> = ["u-alice", "u-bob", "u-carol"]
            .into_iter()
            .map(String::from)
            .collect();
        assert_eq!(members, expected);
    }

    #[test]
    fn player_without_guild_decodes() {
        let raw = r#"{ "username": "Dave", "guild": null }"#;
        let resp: PlayerResp = serde_json::from_str(raw).unwrap();
        assert_eq!(resp.username, "Dave");
        assert!(resp.guild.is_none());
    }
}
