//! Discord embed builders.
//!
//! Text is assembled by plain functions so it can be tested without Discord;
//! the `*_embed` wrappers only attach it to `CreateEmbed`.

use crate::arena::{Battle, BattleStatus, Fighter, RoundSummary, MAX_ROUNDS, STARTING_HP};
use crate::database::ArenaRecord;
use crate::glyphbots::{Artifact, Bot};
use crate::opensea::{CollectionStats, Sale};
use crate::playground::PlaygroundContent;
use crate::utils::validation::is_eth_address;
use crate::utils::format::{format_decimal, mention, relative_time, short_address, truncate};
use poise::serenity_prelude as serenity;
use serenity::{ButtonStyle, CreateActionRow, CreateButton, CreateEmbed, CreateEmbedFooter};

pub const TITLE_LIMIT: usize = 256;
pub const DESCRIPTION_LIMIT: usize = 4096;
pub const FIELD_VALUE_LIMIT: usize = 1024;
const MAX_TRAIT_FIELDS: usize = 12;

/// Embed colour palette.
pub mod colors {
    pub const GLYPH: u32 = 0x7B5CFF;
    pub const MARKET: u32 = 0x2081E2;
    pub const ARENA: u32 = 0xE5484D;
    pub const VICTORY: u32 = 0x30A46C;
    pub const MUTED: u32 = 0x6F6E77;
    pub const PLAYGROUND: u32 = 0xF5A524;
}

pub fn bot_url(site_url: &str, token_id: u32) -> String {
    format!("{}/bot/{}", site_url.trim_end_matches('/'), token_id)
}

pub fn artifact_url(site_url: &str, token_id: u32) -> String {
    format!("{}/artifact/{}", site_url.trim_end_matches('/'), token_id)
}

pub fn bot_embed(bot: &Bot, site_url: &str) -> CreateEmbed {
    let mut embed = CreateEmbed::new()
        .title(truncate(&format!("{} · #{}", bot.name, bot.token_id), TITLE_LIMIT))
        .url(bot_url(site_url, bot.token_id))
        .colour(colors::GLYPH);

    for t in bot.traits.iter().take(MAX_TRAIT_FIELDS) {
        embed = embed.field(
            truncate(&t.trait_type, TITLE_LIMIT),
            truncate(&t.value, FIELD_VALUE_LIMIT),
            true,
        );
    }
    if let Some(rank) = bot.rarity_rank {
        embed = embed.field("Rarity rank", format!("#{}", rank), true);
    }
    if let Some(owner) = &bot.owner {
        let owner = if is_eth_address(owner) {
            format!("`{}`", short_address(owner))
        } else {
            truncate(owner, FIELD_VALUE_LIMIT)
        };
        embed = embed.field("Owner", owner, true);
    }
    if let Some(image) = &bot.image_url {
        embed = embed.image(image);
    }
    embed
}

pub fn artifact_embed(artifact: &Artifact, site_url: &str) -> CreateEmbed {
    let mut embed = CreateEmbed::new()
        .title(truncate(
            &format!("{} · Artifact #{}", artifact.name, artifact.token_id),
            TITLE_LIMIT,
        ))
        .url(artifact_url(site_url, artifact.token_id))
        .colour(colors::GLYPH)
        .field(
            "Created by",
            format!(
                "[GlyphBot #{}]({})",
                artifact.bot_token_id,
                bot_url(site_url, artifact.bot_token_id)
            ),
            true,
        );

    if let Some(description) = &artifact.description {
        embed = embed.description(truncate(description, DESCRIPTION_LIMIT));
    }
    if let Some(created_at) = &artifact.created_at {
        embed = embed.field("Created", created_at, true);
    }
    if let Some(image) = &artifact.image_url {
        embed = embed.image(image);
    }
    embed
}

/// One line per sale: name, price, buyer and relative time.
pub fn sale_line(sale: &Sale) -> String {
    let name = sale
        .name
        .clone()
        .unwrap_or_else(|| format!("GlyphBot #{}", sale.token_id));
    let name = match &sale.opensea_url {
        Some(url) => format!("[{}]({})", name, url),
        None => format!("**{}**", name),
    };
    let buyer = sale
        .buyer
        .as_deref()
        .map(|b| format!(" → `{}`", short_address(b)))
        .unwrap_or_default();
    format!(
        "{} · **{}**{} · {}",
        name,
        sale.price_display(),
        buyer,
        relative_time(sale.timestamp)
    )
}

pub fn sales_embed(sales: &[Sale]) -> CreateEmbed {
    let description = if sales.is_empty() {
        "No recent sales.".to_string()
    } else {
        sales.iter().map(sale_line).collect::<Vec<_>>().join("\n")
    };

    let mut embed = CreateEmbed::new()
        .title("Recent GlyphBots sales")
        .colour(colors::MARKET)
        .description(truncate(&description, DESCRIPTION_LIMIT));
    if let Some(image) = sales.first().and_then(|s| s.image_url.as_ref()) {
        embed = embed.thumbnail(image);
    }
    embed
}

pub fn stats_embed(stats: &CollectionStats, collection_slug: &str) -> CreateEmbed {
    let symbol = stats.floor_price_symbol.as_deref().unwrap_or("ETH");
    let floor = stats
        .floor_price
        .map(|f| format!("{} {}", format_decimal(f), symbol))
        .unwrap_or_else(|| "—".to_string());

    CreateEmbed::new()
        .title("GlyphBots market")
        .url(format!("https://opensea.io/collection/{}", collection_slug))
        .colour(colors::MARKET)
        .field("Floor", floor, true)
        .field("Volume", format!("{} {}", format_decimal(stats.volume), symbol), true)
        .field("Sales", stats.sales.to_string(), true)
        .field("Owners", stats.num_owners.to_string(), true)
}

/// Ten-segment health bar.
pub fn hp_bar(hp: i32) -> String {
    let filled = ((hp.clamp(0, STARTING_HP) * 10 + STARTING_HP - 1) / STARTING_HP) as usize;
    format!("{}{} {}/{}", "█".repeat(filled), "░".repeat(10 - filled), hp, STARTING_HP)
}

pub fn round_line(battle: &Battle, summary: &RoundSummary) -> String {
    let opponent_name = battle
        .opponent
        .as_ref()
        .map(|f| f.bot_name.as_str())
        .unwrap_or("?");
    format!(
        "R{}: **{}** {} (−{}) vs **{}** {} (−{})",
        summary.round,
        battle.challenger.bot_name,
        summary.challenger_move,
        summary.challenger_damage,
        opponent_name,
        summary.opponent_move,
        summary.opponent_damage,
    )
}

/// Main body of a battle embed for its current status.
pub fn battle_description(battle: &Battle) -> String {
    let challenger = mention(battle.challenger.user_id);
    let opponent = mention(battle.opponent_id);

    match battle.status {
        BattleStatus::Pending => format!(
            "{} challenges {} to an arena battle with **{}** (#{})!\n\
             Answer with `/arena accept` or `/arena decline`. The challenge expires {}.",
            challenger,
            opponent,
            battle.challenger.bot_name,
            battle.challenger.bot_id,
            relative_time(battle.deadline)
        ),
        BattleStatus::Active => {
            let mut lines = vec![format!(
                "Round **{}** of {} · moves due {}",
                battle.round,
                MAX_ROUNDS,
                relative_time(battle.deadline)
            )];
            if let Some(last) = battle.log.last() {
                lines.push(round_line(battle, last));
            }
            lines.join("\n")
        }
        BattleStatus::Completed => {
            let headline = match battle.winner {
                Some(winner) if battle.forfeit => {
                    format!("🏆 {} wins by forfeit!", mention(winner))
                }
                Some(winner) => format!("🏆 {} wins the battle!", mention(winner)),
                None => "🤝 The battle ends in a draw.".to_string(),
            };
            let mut lines = vec![headline];
            lines.extend(battle.log.iter().map(|s| round_line(battle, s)));
            lines.join("\n")
        }
        BattleStatus::Expired => format!(
            "⌛ The battle between {} and {} timed out.",
            challenger, opponent
        ),
        BattleStatus::Declined => {
            format!("{} declined the challenge from {}.", opponent, challenger)
        }
        BattleStatus::Cancelled => {
            format!("{} withdrew the challenge to {}.", challenger, opponent)
        }
    }
}

fn fighter_field(fighter: &Fighter, show_lock: bool) -> (String, String, bool) {
    let mut value = format!("{}\n{}", mention(fighter.user_id), hp_bar(fighter.hp));
    if show_lock {
        let locked = fighter.pending_move.is_some();
        value.push_str(if locked { "\n✅ Move locked in" } else { "\n⏳ Choosing…" });
    }
    (format!("{} #{}", fighter.bot_name, fighter.bot_id), value, true)
}

pub fn battle_embed(battle: &Battle) -> CreateEmbed {
    let colour = match battle.status {
        BattleStatus::Completed => colors::VICTORY,
        BattleStatus::Pending | BattleStatus::Active => colors::ARENA,
        _ => colors::MUTED,
    };

    let mut embed = CreateEmbed::new()
        .title("⚔️ GlyphBots Arena")
        .colour(colour)
        .description(truncate(&battle_description(battle), DESCRIPTION_LIMIT))
        .footer(CreateEmbedFooter::new(format!("Battle {}", battle.id)));

    if let Some(opponent) = &battle.opponent {
        let show_lock = battle.status == BattleStatus::Active;
        embed = embed.fields([
            fighter_field(&battle.challenger, show_lock),
            fighter_field(opponent, show_lock),
        ]);
    }
    embed
}

/// Move buttons while the battle is active, nothing otherwise.
pub fn battle_components(battle: &Battle) -> Vec<CreateActionRow> {
    if battle.status != BattleStatus::Active {
        return Vec::new();
    }
    let buttons = crate::arena::Move::ALL
        .into_iter()
        .map(|mv| {
            CreateButton::new(mv.custom_id(&battle.id))
                .label(mv.label())
                .emoji(serenity::ReactionType::Unicode(mv.emoji().to_string()))
                .style(ButtonStyle::Primary)
        })
        .collect();
    vec![CreateActionRow::Buttons(buttons)]
}

pub fn record_line(rank: usize, record: &ArenaRecord) -> String {
    format!(
        "**{}.** {} · {}W / {}L / {}D",
        rank,
        mention(record.user_id),
        record.wins,
        record.losses,
        record.draws
    )
}

pub fn leaderboard_embed(records: &[ArenaRecord]) -> CreateEmbed {
    let description = if records.is_empty() {
        "No battles fought yet.".to_string()
    } else {
        records
            .iter()
            .enumerate()
            .map(|(i, r)| record_line(i + 1, r))
            .collect::<Vec<_>>()
            .join("\n")
    };
    CreateEmbed::new()
        .title("🏆 Arena leaderboard")
        .colour(colors::ARENA)
        .description(description)
}

pub fn playground_embed(content: &PlaygroundContent) -> CreateEmbed {
    let mut embed = CreateEmbed::new()
        .title(truncate(&content.title, TITLE_LIMIT))
        .colour(colors::PLAYGROUND)
        .description(truncate(&content.text, DESCRIPTION_LIMIT))
        .footer(CreateEmbedFooter::new(content.kind.label()));

    if let Some(link) = &content.link {
        embed = embed.url(link);
    }
    match (content.attachment_name(), &content.image_url) {
        (Some(name), _) => embed = embed.attachment(name),
        (None, Some(url)) => embed = embed.image(url),
        (None, None) => {}
    }
    embed
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::arena::Move;

    fn battle() -> Battle {
        Battle::challenge("abcd1234".into(), 1, Fighter::new(10, 42, "Vexel"), 20, 1000, 120, 90)
            .unwrap()
    }

    #[test]
    fn test_hp_bar() {
        assert_eq!(hp_bar(100), "██████████ 100/100");
        assert_eq!(hp_bar(0), "░░░░░░░░░░ 0/100");
        assert_eq!(hp_bar(55), "██████░░░░ 55/100");
        assert_eq!(hp_bar(1), "█░░░░░░░░░ 1/100");
    }

    #[test]
    fn test_battle_description_by_status() {
        let mut b = battle();
        let text = battle_description(&b);
        assert!(text.contains("<@10> challenges <@20>"));
        assert!(text.contains("**Vexel** (#42)"));
        assert!(text.contains("<t:1120:R>"));

        b.accept(Fighter::new(20, 7, "Quill"), 1010).unwrap();
        b.submit_move(10, Move::Strike, 1020).unwrap();
        b.submit_move(20, Move::Guard, 1020).unwrap();
        let text = battle_description(&b);
        assert!(text.starts_with("Round **2** of 5"));
        assert!(
            text.contains("R1: **Vexel** ⚔️ Strike (−10) vs **Quill** 🛡️ Guard (−0)")
        );
        assert_eq!(battle_components(&b).len(), 1);

        b.forfeit(10, 1030).unwrap();
        assert_eq!(battle_description(&b).lines().next(), Some("🏆 <@20> wins by forfeit!"));
        assert!(battle_components(&b).is_empty());
    }

    #[test]
    fn test_fighter_field_lock_state() {
        let mut b = battle();
        b.accept(Fighter::new(20, 7, "Quill"), 1010).unwrap();
        b.submit_move(10, Move::Charge, 1020).unwrap();

        let (name, value, inline) = fighter_field(&b.challenger, true);
        assert_eq!(name, "Vexel #42");
        assert_eq!(value, "<@10>\n██████████ 100/100\n✅ Move locked in");
        assert!(inline);

        let opponent = b.opponent.as_ref().unwrap();
        assert!(fighter_field(opponent, true).1.ends_with("⏳ Choosing…"));
        assert_eq!(fighter_field(opponent, false).1, "<@20>\n██████████ 100/100");
    }

    #[test]
    fn test_battle_description_terminal() {
        let mut b = battle();
        b.expire(2000);
        assert!(battle_description(&b).contains("timed out"));

        let mut b = battle();
        b.decline(20, 1001).unwrap();
        assert_eq!(battle_description(&b), "<@20> declined the challenge from <@10>.");
    }

    #[test]
    fn test_record_line() {
        let record = ArenaRecord { user_id: 5, wins: 3, losses: 1, draws: 2 };
        assert_eq!(record_line(1, &record), "**1.** <@5> · 3W / 1L / 2D");
    }

    #[test]
    fn test_sale_line() {
        let sale = Sale {
            token_id: "42".into(),
            name: None,
            image_url: None,
            opensea_url: None,
            price_raw: "50000000000000000".into(),
            decimals: 18,
            symbol: "ETH".into(),
            seller: None,
            buyer: Some("0x52bd3b2dc8a0bf4e6c1e5f0a7b0c0d7e9f1a2b3c".into()),
            timestamp: 1760000000,
            transaction: None,
        };
        assert_eq!(
            sale_line(&sale),
            "**GlyphBot #42** · **0.05 ETH** → `0x52bd…2b3c` · <t:1760000000:R>"
        );
    }

    #[test]
    fn test_urls() {
        assert_eq!(bot_url("https://glyphbots.com/", 7), "https://glyphbots.com/bot/7");
        assert_eq!(artifact_url("https://glyphbots.com", 9), "https://glyphbots.com/artifact/9");
    }
}
