use anyhow::{Result, bail};
use sea_orm::ActiveValue::Set;
use sea_orm::{DatabaseConnection, EntityTrait, PaginatorTrait};
use tracing::info;

use game_core::{DISTRACTOR_COUNT, MAX_CORRECT_CAPTIONS, ROUNDS_PER_GAME};

use crate::entities::{captions, memes, prelude::*};

/// One catalog entry: a meme image and the captions that fit it.
pub struct SeedMeme {
    pub image_ref: &'static str,
    pub captions: &'static [&'static str],
}

/// Starter catalog installed on a fresh database. Six memes with two fitting
/// captions each, so any meme sees ten captions from the other five as
/// distractors.
pub const DEFAULT_CATALOG: &[SeedMeme] = &[
    SeedMeme {
        image_ref: "memes/distracted-boyfriend.webp",
        captions: &[
            "Me, ignoring my finished side projects, eyeing a new framework",
            "My diet plan watching me walk past the bakery",
        ],
    },
    SeedMeme {
        image_ref: "memes/this-is-fine.webp",
        captions: &[
            "Me reviewing the on-call alerts from last night",
            "The codebase after we shipped without tests",
        ],
    },
    SeedMeme {
        image_ref: "memes/galaxy-brain.webp",
        captions: &[
            "Renaming the variable instead of fixing the bug",
            "Writing the documentation before the code",
        ],
    },
    SeedMeme {
        image_ref: "memes/success-kid.webp",
        captions: &[
            "Merged to main with zero review comments",
            "Guessed the wifi password on the first try",
        ],
    },
    SeedMeme {
        image_ref: "memes/surprised-pikachu.webp",
        captions: &[
            "When the untested code does not work",
            "Deleted the database and the backups were the database",
        ],
    },
    SeedMeme {
        image_ref: "memes/waiting-skeleton.webp",
        captions: &[
            "Still waiting for the CI queue to pick up my job",
            "Me waiting for the standup to end so I can code",
        ],
    },
];

/// A catalog is playable only if it holds enough memes for a full game of
/// distinct rounds and every meme can fill a full candidate set.
pub fn validate_catalog(catalog: &[SeedMeme]) -> Result<()> {
    if catalog.len() < ROUNDS_PER_GAME {
        bail!(
            "catalog has {} memes, a game needs {}",
            catalog.len(),
            ROUNDS_PER_GAME
        );
    }
    let total_captions: usize = catalog.iter().map(|m| m.captions.len()).sum();
    for meme in catalog {
        if meme.captions.len() < MAX_CORRECT_CAPTIONS {
            bail!(
                "meme {} has {} captions, need at least {}",
                meme.image_ref,
                meme.captions.len(),
                MAX_CORRECT_CAPTIONS
            );
        }
        let distractors = total_captions - meme.captions.len();
        if distractors < DISTRACTOR_COUNT {
            bail!(
                "meme {} has only {} distractors available, need at least {}",
                meme.image_ref,
                distractors,
                DISTRACTOR_COUNT
            );
        }
    }
    Ok(())
}

/// Install `DEFAULT_CATALOG` when the memes table is empty. A populated
/// catalog is left alone.
pub async fn seed_default_content(db: &DatabaseConnection) -> Result<()> {
    seed_content(db, DEFAULT_CATALOG).await
}

pub async fn seed_content(db: &DatabaseConnection, catalog: &[SeedMeme]) -> Result<()> {
    if Memes::find().count(db).await? > 0 {
        return Ok(());
    }
    validate_catalog(catalog)?;

    for seed in catalog {
        let meme = memes::ActiveModel {
            image_ref: Set(seed.image_ref.to_string()),
            ..Default::default()
        };
        let meme_id = Memes::insert(meme).exec(db).await?.last_insert_id;

        for text in seed.captions {
            let caption = captions::ActiveModel {
                text: Set((*text).to_string()),
                meme_ids: Set(serde_json::to_string(&[meme_id])?),
                ..Default::default()
            };
            Captions::insert(caption).exec(db).await?;
        }
    }

    info!(memes = catalog.len(), "seeded content catalog");
    Ok(())
}
