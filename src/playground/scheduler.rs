use super::prompts;
use super::rotation::{ContentKind, Rotation};
use crate::database::PlaygroundPost;
use crate::embeds;
use crate::error::{GlyphBotsError, Result};
use crate::genai::{GenAiClient, GeneratedImage};
use crate::services::Services;
use crate::utils::unix_now;
use poise::serenity_prelude as serenity;
use rand::Rng;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

/// Recent artifacts an artifact showcase picks from.
const ARTIFACT_POOL: u32 = 10;
/// Completed battles summarised in an arena recap.
const RECAP_BATTLES: u32 = 3;

/// A post ready to be sent, minus the Discord specifics.
#[derive(Debug, Clone)]
pub struct PlaygroundContent {
    pub kind: ContentKind,
    pub title: String,
    pub text: String,
    /// Generated artwork, if the image model delivered
    pub image: Option<GeneratedImage>,
    /// Fallback image from the collection itself
    pub image_url: Option<String>,
    pub link: Option<String>,
}

impl PlaygroundContent {
    pub fn attachment_name(&self) -> Option<String> {
        self.image
            .as_ref()
            .map(|img| format!("playground.{}", img.extension()))
    }
}

/// Everything needed to generate a post of one kind.
struct Draft {
    kind: ContentKind,
    title: String,
    text_prompt: String,
    image_prompt: String,
    image_url: Option<String>,
    link: Option<String>,
}

/// Snapshot returned by `/playground status`.
#[derive(Debug, Clone)]
pub struct PlaygroundStatus {
    pub enabled: bool,
    pub channel_id: Option<u64>,
    pub interval: Duration,
    pub last_post: Option<PlaygroundPost>,
}

/// Posts AI-generated content to one channel on a fixed interval.
pub struct PlaygroundScheduler {
    channel_id: Option<u64>,
    enabled: AtomicBool,
    interval: Duration,
    /// Held for the whole of a post so ticks and manual posts never overlap
    rotation: Mutex<Rotation>,
    last_post: Mutex<Option<PlaygroundPost>>,
}

impl PlaygroundScheduler {
    pub fn new(channel_id: Option<u64>, interval: Duration, enabled: bool) -> Self {
        Self {
            channel_id,
            enabled: AtomicBool::new(enabled),
            interval,
            rotation: Mutex::new(Rotation::new()),
            last_post: Mutex::new(None),
        }
    }

    /// Pick up the rotation where the previous run left it.
    pub async fn restore(&self, services: &Services) -> Result<()> {
        let Some(post) = services.playground.last_post().await? else {
            return Ok(());
        };
        *self.rotation.lock().await = Rotation::resume(ContentKind::parse(&post.kind));
        *self.last_post.lock().await = Some(post);
        Ok(())
    }

    /// Start the periodic posting loop. The first post happens one interval in.
    pub fn spawn(
        self: Arc<Self>,
        http: Arc<serenity::Http>,
        services: Services,
    ) -> tokio::task::JoinHandle<()> {
        tokio::spawn(async move {
            let start = tokio::time::Instant::now() + self.interval;
            let mut ticker = tokio::time::interval_at(start, self.interval);
            ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
            info!(
                interval_secs = self.interval.as_secs(),
                channel_id = ?self.channel_id,
                "playground scheduler started"
            );

            loop {
                ticker.tick().await;
                if !self.is_enabled() || self.channel_id.is_none() {
                    continue;
                }
                match self.post_next(&http, &services).await {
                    Ok(post) => info!(
                        kind = %post.kind,
                        message_id = post.message_id,
                        "playground post sent"
                    ),
                    Err(e) => warn!(error = %e, "playground post failed"),
                }
            }
        })
    }

    /// Generate and send the next post right away.
    ///
    /// # Errors
    ///
    /// Returns an error if no channel or AI key is configured, the source data
    /// cannot be fetched, text generation fails after its retries, or Discord
    /// rejects the message. The rotation is left untouched on failure.
    pub async fn post_next(
        &self,
        http: &serenity::Http,
        services: &Services,
    ) -> Result<PlaygroundPost> {
        let channel_id = self.channel_id.ok_or_else(|| {
            GlyphBotsError::Config("PLAYGROUND_CHANNEL_ID is not set".to_string())
        })?;
        let ai = services.ai.as_ref().ok_or_else(|| {
            GlyphBotsError::Config("GOOGLE_AI_API_KEY is not set".to_string())
        })?;

        let mut rotation = self.rotation.lock().await;
        let kind = {
            let mut rng = rand::rng();
            rotation.next(&mut rng)
        };
        debug!(kind = kind.as_str(), "composing playground post");

        let content = compose(kind, rotation.last(), services, ai).await?;
        let message_id = deliver(http, channel_id, &content).await?;
        rotation.record(content.kind);

        let post = PlaygroundPost {
            kind: content.kind.as_str().to_string(),
            channel_id,
            message_id,
            posted_at: unix_now(),
        };
        if let Err(e) = services.playground.record_post(post.clone()).await {
            warn!(error = %e, "failed to record playground post");
        }
        *self.last_post.lock().await = Some(post.clone());
        Ok(post)
    }

    /// Enable posting. Returns false if it was already enabled.
    pub fn start(&self) -> bool {
        !self.enabled.swap(true, Ordering::SeqCst)
    }

    /// Disable posting. Returns false if it was already disabled.
    pub fn stop(&self) -> bool {
        self.enabled.swap(false, Ordering::SeqCst)
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled.load(Ordering::SeqCst)
    }

    pub async fn status(&self) -> PlaygroundStatus {
        PlaygroundStatus {
            enabled: self.is_enabled(),
            channel_id: self.channel_id,
            interval: self.interval,
            last_post: self.last_post.lock().await.clone(),
        }
    }
}

/// Bot post used when `ArtifactShowcase` or `ArenaRecap` has nothing to show.
/// Never the same kind as `previous`.
pub fn fallback_kind(previous: Option<ContentKind>) -> ContentKind {
    match previous {
        Some(ContentKind::BotSpotlight) => ContentKind::BotLore,
        _ => ContentKind::BotSpotlight,
    }
}

/// Fetch the source data for `kind` and generate the post.
///
/// `previous` is the kind of the last post; a fallback never repeats it.
/// Text is required. A failed image falls back to the collection artwork.
pub async fn compose(
    kind: ContentKind,
    previous: Option<ContentKind>,
    services: &Services,
    ai: &GenAiClient,
) -> Result<PlaygroundContent> {
    let draft = match kind {
        ContentKind::BotSpotlight | ContentKind::BotLore => bot_draft(kind, services).await?,
        ContentKind::ArtifactShowcase => match artifact_draft(services).await? {
            Some(draft) => draft,
            None => {
                let fallback = fallback_kind(previous);
                info!(fallback = fallback.as_str(), "no artifacts to showcase");
                bot_draft(fallback, services).await?
            }
        },
        ContentKind::ArenaRecap => match recap_draft(services).await? {
            Some(draft) => draft,
            None => {
                let fallback = fallback_kind(previous);
                info!(fallback = fallback.as_str(), "no completed battles to recap");
                bot_draft(fallback, services).await?
            }
        },
    };

    let text = ai.generate_text(&draft.text_prompt).await?;
    let image = match ai.generate_image(&draft.image_prompt).await {
        Ok(image) => Some(image),
        Err(e) => {
            warn!(
                kind = draft.kind.as_str(),
                error = %e,
                "image generation failed, using collection artwork"
            );
            None
        }
    };

    Ok(PlaygroundContent {
        kind: draft.kind,
        title: draft.title,
        text,
        image,
        image_url: draft.image_url,
        link: draft.link,
    })
}

async fn bot_draft(kind: ContentKind, services: &Services) -> Result<Draft> {
    let bot = services.glyphbots.random_bot().await?;
    let text_prompt = match kind {
        ContentKind::BotLore => prompts::bot_lore(&bot),
        _ => prompts::bot_spotlight(&bot),
    };
    Ok(Draft {
        kind,
        title: format!("{} · {} #{}", kind.label(), bot.name, bot.token_id),
        text_prompt,
        image_prompt: prompts::bot_image(&bot),
        image_url: bot.image_url.clone(),
        link: Some(embeds::bot_url(&services.site_url, bot.token_id)),
    })
}

async fn artifact_draft(services: &Services) -> Result<Option<Draft>> {
    let artifacts = services.glyphbots.recent_artifacts(ARTIFACT_POOL).await?;
    if artifacts.is_empty() {
        return Ok(None);
    }
    let index = rand::rng().random_range(0..artifacts.len());
    let artifact = &artifacts[index];

    Ok(Some(Draft {
        kind: ContentKind::ArtifactShowcase,
        title: format!("{} · {}", ContentKind::ArtifactShowcase.label(), artifact.name),
        text_prompt: prompts::artifact_showcase(artifact),
        image_prompt: prompts::artifact_image(artifact),
        image_url: artifact.image_url.clone(),
        link: Some(embeds::artifact_url(&services.site_url, artifact.token_id)),
    }))
}

async fn recap_draft(services: &Services) -> Result<Option<Draft>> {
    let battles = services.battles.recent_completed(RECAP_BATTLES).await?;
    let Some(text_prompt) = prompts::arena_recap(&battles) else {
        return Ok(None);
    };
    let Some(latest) = battles.first() else {
        return Ok(None);
    };

    Ok(Some(Draft {
        kind: ContentKind::ArenaRecap,
        title: ContentKind::ArenaRecap.label().to_string(),
        text_prompt,
        image_prompt: prompts::arena_image(latest),
        image_url: None,
        link: None,
    }))
}

/// Send a post and return the message id.
async fn deliver(
    http: &serenity::Http,
    channel_id: u64,
    content: &PlaygroundContent,
) -> Result<u64> {
    let mut message = serenity::CreateMessage::new().embed(embeds::playground_embed(content));
    if let (Some(image), Some(name)) = (&content.image, content.attachment_name()) {
        message = message.add_file(serenity::CreateAttachment::bytes(image.bytes.clone(), name));
    }

    let sent = serenity::ChannelId::new(channel_id)
        .send_message(http, message)
        .await?;
    Ok(sent.id.get())
}
