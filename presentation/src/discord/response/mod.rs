pub mod unavailable;

use domain_shared::reply::{Embed, Reply, MESSAGE_LIMIT};
use poise::serenity_prelude::{CreateEmbed, CreateEmbedAuthor, CreateEmbedFooter};
use poise::CreateReply;
use tracing::instrument;

/// One Discord message per element, in sending order.
#[instrument(level = "trace", skip_all)]
pub fn create_replies(reply: Reply) -> Vec<CreateReply> {
    match reply {
        Reply::Text(text) => split_message(&text)
            .into_iter()
            .map(|content| CreateReply::default().content(content))
            .collect(),
        Reply::Pages(pages) => pages
            .iter()
            .flat_map(|page| split_message(page))
            .map(|content| CreateReply::default().content(content))
            .collect(),
        Reply::Embed(embed) => vec![CreateReply::default().embed(create_embed(embed))],
    }
}

/// Cuts text that would not fit a single message, on character boundaries.
fn split_message(text: &str) -> Vec<String> {
    if text.len() <= MESSAGE_LIMIT {
        return vec![text.to_string()];
    }

    let mut messages = Vec::new();
    let mut current = String::new();
    for character in text.chars() {
        if current.len() + character.len_utf8() > MESSAGE_LIMIT {
            messages.push(std::mem::take(&mut current));
        }
        current.push(character);
    }
    if !current.is_empty() {
        messages.push(current);
    }
    messages
}

pub fn create_embed(embed: Embed) -> CreateEmbed {
    let mut create_embed = CreateEmbed::default();

    if let Some(title) = embed.title {
        create_embed = create_embed.title(title);
    }
    if let Some(description) = embed.description {
        create_embed = create_embed.description(description);
    }
    if let Some(url) = embed.url {
        create_embed = create_embed.url(url);
    }
    if let Some(colour) = embed.colour {
        create_embed = create_embed.colour(colour);
    }
    if let Some(author) = embed.author {
        let mut create_author = CreateEmbedAuthor::new(author.name);
        if let Some(url) = author.url {
            create_author = create_author.url(url);
        }
        if let Some(icon_url) = author.icon_url {
            create_author = create_author.icon_url(icon_url);
        }
        create_embed = create_embed.author(create_author);
    }
    create_embed = create_embed.fields(
        embed
            .fields
            .into_iter()
            .map(|field| (field.name, field.value, field.inline)),
    );
    if let Some(image) = embed.image {
        create_embed = create_embed.image(image);
    }
    if let Some(thumbnail) = embed.thumbnail {
        create_embed = create_embed.thumbnail(thumbnail);
    }
    if let Some(footer) = embed.footer {
        let mut create_footer = CreateEmbedFooter::new(footer.text);
        if let Some(icon_url) = footer.icon_url {
            create_footer = create_footer.icon_url(icon_url);
        }
        create_embed = create_embed.footer(create_footer);
    }

    create_embed
}
