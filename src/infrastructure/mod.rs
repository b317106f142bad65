pub mod clock;
pub mod console_notifier;
pub mod discord_notifier;
pub mod multi_notifier;
pub mod static_guild_source;
pub mod wynncraft_provider;
