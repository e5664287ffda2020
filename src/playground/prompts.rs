//! Prompt templates for playground posts.

use crate::arena::{Battle, BattleStatus};
use crate::glyphbots::{Artifact, Bot};
use crate::utils::format::truncate;

const MAX_TRAITS_IN_PROMPT: usize = 8;
const MAX_DESCRIPTION_IN_PROMPT: usize = 600;

const STYLE: &str = "You write for the GlyphBots Discord community. GlyphBots are \
on-chain robots drawn from glyphs. Keep the tone playful and vivid, avoid financial \
advice, and never invent prices. Use plain text, at most 120 words, no hashtags.";

fn trait_list(bot: &Bot) -> String {
    if bot.traits.is_empty() {
        return "no recorded traits".to_string();
    }
    bot.traits
        .iter()
        .take(MAX_TRAITS_IN_PROMPT)
        .map(|t| format!("{}: {}", t.trait_type, t.value))
        .collect::<Vec<_>>()
        .join(", ")
}

pub fn bot_spotlight(bot: &Bot) -> String {
    format!(
        "{}\n\nWrite a short spotlight introducing {} (GlyphBot #{}) to the community. \
         Its traits are: {}. Highlight what makes it stand out.",
        STYLE,
        bot.name,
        bot.token_id,
        trait_list(bot)
    )
}

pub fn bot_lore(bot: &Bot) -> String {
    format!(
        "{}\n\nWrite a tiny piece of lore, a log entry or a legend, about {} (GlyphBot #{}). \
         Weave in these traits: {}.",
        STYLE,
        bot.name,
        bot.token_id,
        trait_list(bot)
    )
}

pub fn artifact_showcase(artifact: &Artifact) -> String {
    let description = artifact
        .description
        .as_deref()
        .map(|d| {
            format!(
                " Its creator describes it as: \"{}\".",
                truncate(d, MAX_DESCRIPTION_IN_PROMPT)
            )
        })
        .unwrap_or_default();
    format!(
        "{}\n\nPresent the artifact \"{}\" (#{}), forged by GlyphBot #{}, like a museum curator \
         with a sense of humour.{}",
        STYLE, artifact.name, artifact.token_id, artifact.bot_token_id, description
    )
}

/// One line per battle, naming both bots and the outcome.
pub fn battle_summary(battle: &Battle) -> Option<String> {
    if battle.status != BattleStatus::Completed {
        return None;
    }
    let opponent = battle.opponent.as_ref()?;
    let challenger = &battle.challenger;

    let outcome = match battle.winner {
        Some(w) if w == challenger.user_id => {
            format!("{} defeated {}", challenger.bot_name, opponent.bot_name)
        }
        Some(_) => format!("{} defeated {}", opponent.bot_name, challenger.bot_name),
        None => format!("{} and {} fought to a draw", challenger.bot_name, opponent.bot_name),
    };
    let how = if battle.forfeit {
        " after the loser walked away".to_string()
    } else {
        format!(
            " in {} round(s), final HP {} to {}",
            battle.log.len(),
            challenger.hp,
            opponent.hp
        )
    };
    Some(format!("{}{}", outcome, how))
}

pub fn arena_recap(battles: &[Battle]) -> Option<String> {
    let lines: Vec<String> = battles.iter().filter_map(battle_summary).collect();
    if lines.is_empty() {
        return None;
    }
    Some(format!(
        "{}\n\nWrite an energetic sports-style recap of these recent arena battles:\n- {}",
        STYLE,
        lines.join("\n- ")
    ))
}

/// Image prompt for a bot-centred post. A `Background` trait sets the scene.
pub fn bot_image(bot: &Bot) -> String {
    let scene = bot
        .trait_value("Background")
        .map(|b| format!(" Set against a {} backdrop.", b))
        .unwrap_or_default();
    format!(
        "A colourful retro-futuristic illustration of a robot named {} with these features: {}.{} \
         Pixel-glyph aesthetic, no text.",
        bot.name,
        trait_list(bot),
        scene
    )
}

pub fn artifact_image(artifact: &Artifact) -> String {
    format!(
        "A glowing relic called \"{}\" displayed on a pedestal in a robot museum, pixel-glyph \
         aesthetic, no text.",
        artifact.name
    )
}

pub fn arena_image(battle: &Battle) -> String {
    let opponent = battle
        .opponent
        .as_ref()
        .map(|f| f.bot_name.as_str())
        .unwrap_or("a rival robot");
    format!(
        "Two robots, {} and {}, clashing in a neon arena, dynamic action shot, pixel-glyph \
         aesthetic, no text.",
        battle.challenger.bot_name, opponent
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::arena::{Fighter, Move};
    use crate::glyphbots::Trait;

    fn bot() -> Bot {
        Bot {
            token_id: 42,
            name: "Vexel".into(),
            image_url: None,
            traits: vec![
                Trait { trait_type: "Body".into(), value: "Chrome".into() },
                Trait { trait_type: "Eyes".into(), value: "Laser".into() },
            ],
            rarity_rank: None,
            owner: None,
        }
    }

    fn finished_battle() -> Battle {
        let mut b =
            Battle::challenge("b1".into(), 1, Fighter::new(1, 42, "Vexel"), 2, 0, 60, 60).unwrap();
        b.accept(Fighter::new(2, 7, "Quill"), 1).unwrap();
        for now in 2..6 {
            b.submit_move(1, Move::Charge, now).unwrap();
            b.submit_move(2, Move::Guard, now).unwrap();
        }
        b
    }

    #[test]
    fn test_bot_prompts_include_traits() {
        let spotlight = bot_spotlight(&bot());
        assert!(spotlight.contains("Vexel (GlyphBot #42)"));
        assert!(spotlight.contains("Body: Chrome, Eyes: Laser"));
        assert!(bot_lore(&bot()).contains("Body: Chrome"));
        assert!(bot_image(&bot()).contains("robot named Vexel"));
        assert!(!bot_image(&bot()).contains("backdrop"));
    }

    #[test]
    fn test_bot_image_uses_background_trait() {
        let mut bot = bot();
        bot.traits.push(Trait { trait_type: "background".into(), value: "Sunset Grid".into() });
        let prompt = bot_image(&bot);
        assert!(prompt.contains("Set against a Sunset Grid backdrop."));
        assert!(prompt.contains("background: Sunset Grid"));
    }

    #[test]
    fn test_artifact_prompt() {
        let artifact = Artifact {
            token_id: 9,
            name: "Glyph Lantern".into(),
            bot_token_id: 42,
            image_url: None,
            description: Some("Lights the way".into()),
            created_at: None,
        };
        let prompt = artifact_showcase(&artifact);
        assert!(prompt.contains("\"Glyph Lantern\" (#9), forged by GlyphBot #42"));
        assert!(prompt.contains("\"Lights the way\""));
    }

    #[test]
    fn test_battle_summary() {
        let battle = finished_battle();
        assert_eq!(
            battle_summary(&battle).as_deref(),
            Some("Vexel defeated Quill in 4 round(s), final HP 100 to 0")
        );
    }

    #[test]
    fn test_arena_recap_skips_unfinished() {
        let pending =
            Battle::challenge("b2".into(), 1, Fighter::new(3, 1, "Nib"), 4, 0, 60, 60).unwrap();
        assert_eq!(arena_recap(&[pending.clone()]), None);

        let recap = arena_recap(&[pending, finished_battle()]).unwrap();
        assert!(recap.contains("- Vexel defeated Quill"));
        assert_eq!(recap.matches("\n- ").count(), 1);
    }
}
