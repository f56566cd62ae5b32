use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use time::OffsetDateTime;
use utoipa::ToSchema;
use uuid::Uuid;

/// One encoded variant of a title's video.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
pub enum Quality {
    #[serde(rename = "fhd", alias = "source")]
    Source,
    #[serde(rename = "hd")]
    Hd,
    #[serde(rename = "sd")]
    Sd,
}

impl Quality {
    pub const ALL: [Quality; 3] = [Quality::Source, Quality::Hd, Quality::Sd];

    pub fn as_str(&self) -> &'static str {
        match self {
            Quality::Source => "fhd",
            Quality::Hd => "hd",
            Quality::Sd => "sd",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "fhd" | "source" => Some(Quality::Source),
            "hd" => Some(Quality::Hd),
            "sd" => Some(Quality::Sd),
            _ => None,
        }
    }
}

/// Stored paths (relative to the media root) of each rendition of a title.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct RenditionSet {
    #[serde(rename = "fhd", alias = "source", default)]
    pub source: Option<String>,
    #[serde(default)]
    pub hd: Option<String>,
    #[serde(default)]
    pub sd: Option<String>,
}

impl RenditionSet {
    pub fn get(&self, quality: Quality) -> Option<&str> {
        match quality {
            Quality::Source => self.source.as_deref(),
            Quality::Hd => self.hd.as_deref(),
            Quality::Sd => self.sd.as_deref(),
        }
    }

    pub fn set(&mut self, quality: Quality, path: String) {
        let slot = match quality {
            Quality::Source => &mut self.source,
            Quality::Hd => &mut self.hd,
            Quality::Sd => &mut self.sd,
        };
        *slot = Some(path);
    }

    pub fn available(&self) -> Vec<&'static str> {
        Quality::ALL
            .iter()
            .filter(|q| self.get(**q).is_some())
            .map(Quality::as_str)
            .collect()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub enum MovieCategory {
    #[default]
    Trending,
    Popular,
    NewReleases,
}

impl MovieCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            MovieCategory::Trending => "trending",
            MovieCategory::Popular => "popular",
            MovieCategory::NewReleases => "newReleases",
        }
    }

    pub fn from_db(value: &str) -> Self {
        match value {
            "popular" => MovieCategory::Popular,
            "newReleases" => MovieCategory::NewReleases,
            _ => MovieCategory::Trending,
        }
    }
}

/// Badge shown on the catalog card; independent of which renditions exist.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ToSchema)]
pub enum QualityBadge {
    #[default]
    #[serde(rename = "HD")]
    Hd,
    #[serde(rename = "4K")]
    Uhd,
    #[serde(rename = "SD")]
    Sd,
}

impl QualityBadge {
    pub fn as_str(&self) -> &'static str {
        match self {
            QualityBadge::Hd => "HD",
            QualityBadge::Uhd => "4K",
            QualityBadge::Sd => "SD",
        }
    }

    pub fn from_db(value: &str) -> Self {
        match value {
            "4K" => QualityBadge::Uhd,
            "SD" => QualityBadge::Sd,
            _ => QualityBadge::Hd,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Movie {
    pub id: Uuid,
    pub title: String,
    pub poster: String,
    pub description: String,
    pub genres: String,
    pub cast: String,
    pub director: String,
    pub rating: String,
    pub year: String,
    pub duration: String,
    pub quality: QualityBadge,
    #[serde(rename = "type")]
    pub category: MovieCategory,
    pub videos: RenditionSet,
    #[serde(with = "time::serde::rfc3339")]
    #[schema(value_type = String, format = DateTime)]
    pub created_at: OffsetDateTime,
}

/// Flat row shape of the `movies` table.
#[derive(Debug, FromRow)]
pub struct MovieRow {
    pub id: Uuid,
    pub title: String,
    pub poster: String,
    pub description: String,
    pub genres: String,
    pub cast_list: String,
    pub director: String,
    pub rating: String,
    pub release_year: String,
    pub duration: String,
    pub quality: String,
    pub category: String,
    pub video_fhd: Option<String>,
    pub video_hd: Option<String>,
    pub video_sd: Option<String>,
    pub created_at: OffsetDateTime,
}

impl From<MovieRow> for Movie {
    fn from(row: MovieRow) -> Self {
        Self {
            id: row.id,
            title: row.title,
            poster: row.poster,
            description: row.description,
            genres: row.genres,
            cast: row.cast_list,
            director: row.director,
            rating: row.rating,
            year: row.release_year,
            duration: row.duration,
            quality: QualityBadge::from_db(&row.quality),
            category: MovieCategory::from_db(&row.category),
            videos: RenditionSet {
                source: row.video_fhd,
                hd: row.video_hd,
                sd: row.video_sd,
            },
            created_at: row.created_at,
        }
    }
}
