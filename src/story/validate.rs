use std::collections::HashSet;
use std::fmt;

use crate::story::model::{
    Block, DirectionKind, StoryDescriptor, VideoDirection, direction_index,
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum SchemaPathElem {
    Field(&'static str),
    Key(String),
    Index(usize),
}

/// One validation failure with its JSON path.
#[derive(Debug, Clone)]
pub struct SchemaIssue {
    pub(crate) path: Vec<SchemaPathElem>,
    /// Id of the block the issue belongs to, when inside `blocks`.
    pub block: Option<String>,
    /// Description of the problem.
    pub message: String,
}

impl SchemaIssue {
    fn at(path: &[SchemaPathElem], block: Option<&str>, message: impl Into<String>) -> Self {
        Self {
            path: path.to_vec(),
            block: block.map(str::to_owned),
            message: message.into(),
        }
    }

    /// JSON path of the offending value, e.g. `$.blocks[1].speech.tags.3`.
    pub fn path(&self) -> String {
        format_path(&self.path)
    }
}

impl fmt::Display for SchemaIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", format_path(&self.path))?;
        if let Some(block) = &self.block {
            write!(f, " (block '{block}')")?;
        }
        write!(f, ": {}", self.message)
    }
}

fn format_path(path: &[SchemaPathElem]) -> String {
    let mut s = String::from("$");
    for p in path {
        match p {
            SchemaPathElem::Field(name) => {
                s.push('.');
                s.push_str(name);
            }
            SchemaPathElem::Key(key) => {
                s.push('.');
                s.push_str(key);
            }
            SchemaPathElem::Index(i) => {
                s.push('[');
                s.push_str(&i.to_string());
                s.push(']');
            }
        }
    }
    s
}

/// All validation failures of a story.
#[derive(Debug, Clone)]
pub struct SchemaIssues {
    /// Issues in document order.
    pub issues: Vec<SchemaIssue>,
}

impl fmt::Display for SchemaIssues {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, e) in self.issues.iter().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            write!(f, "{e}")?;
        }
        Ok(())
    }
}

impl std::error::Error for SchemaIssues {}

pub(crate) fn validate_story(story: &StoryDescriptor) -> Result<(), SchemaIssues> {
    let mut issues = Vec::new();

    if story.blocks.is_empty() {
        issues.push(SchemaIssue::at(
            &[SchemaPathElem::Field("blocks")],
            None,
            "story must contain at least one block",
        ));
    }

    for (video_id, video) in &story.metadata.videos {
        let path = [
            SchemaPathElem::Field("metadata"),
            SchemaPathElem::Key(video_id.clone()),
        ];
        if video.key.trim().is_empty() {
            issues.push(SchemaIssue::at(&path, None, "video key must be non-empty"));
        }
        for (seg_id, seg) in &video.transcription {
            let mut p = path.to_vec();
            p.push(SchemaPathElem::Field("transcription"));
            p.push(SchemaPathElem::Key(seg_id.clone()));
            if !seg.start.is_finite() || !seg.end.is_finite() || seg.start < 0.0 {
                issues.push(SchemaIssue::at(
                    &p,
                    None,
                    "segment bounds must be finite and start >= 0",
                ));
            } else if seg.end < seg.start {
                issues.push(SchemaIssue::at(&p, None, "segment end must be >= start"));
            }
        }
    }

    let mut ids = HashSet::<&str>::new();
    for (bi, block) in story.blocks.iter().enumerate() {
        let path = vec![SchemaPathElem::Field("blocks"), SchemaPathElem::Index(bi)];
        if block.id.trim().is_empty() {
            issues.push(SchemaIssue::at(&path, None, "block id must be non-empty"));
        } else if !ids.insert(block.id.as_str()) {
            issues.push(SchemaIssue::at(
                &path,
                Some(&block.id),
                "block id must be unique",
            ));
        }
        validate_block(story, block, path, &mut issues);
    }

    if issues.is_empty() {
        Ok(())
    } else {
        Err(SchemaIssues { issues })
    }
}

fn validate_block(
    story: &StoryDescriptor,
    block: &Block,
    path: Vec<SchemaPathElem>,
    issues: &mut Vec<SchemaIssue>,
) {
    let id = Some(block.id.as_str());

    if block.speech.is_none() && block.video.is_none() {
        issues.push(SchemaIssue::at(
            &path,
            id,
            "block needs speech or a video direction",
        ));
    }

    let directions = &block.stage.directions;
    if let Some(speech) = &block.speech {
        let mut sp = path.clone();
        sp.push(SchemaPathElem::Field("speech"));
        if speech.asset.key.trim().is_empty() {
            let mut p = sp.clone();
            p.push(SchemaPathElem::Field("asset"));
            issues.push(SchemaIssue::at(&p, id, "speech asset key must be non-empty"));
        }
        for (key, tag) in &speech.tags {
            let mut p = sp.clone();
            p.push(SchemaPathElem::Field("tags"));
            p.push(SchemaPathElem::Key(key.clone()));
            match direction_index(key) {
                Some(i) if i < directions.len() => {}
                Some(i) => issues.push(SchemaIssue::at(
                    &p,
                    id,
                    format!(
                        "tag refers to direction {i} but the block has {} directions",
                        directions.len()
                    ),
                )),
                None => issues.push(SchemaIssue::at(
                    &p,
                    id,
                    "tag key must be a canonical decimal direction index",
                )),
            }
            if !tag.time_offset.is_finite() || tag.time_offset < 0.0 {
                issues.push(SchemaIssue::at(
                    &p,
                    id,
                    "timeOffset must be finite and >= 0",
                ));
            }
        }
    }

    for (di, direction) in directions.iter().enumerate() {
        let mut p = path.clone();
        p.push(SchemaPathElem::Field("stage"));
        p.push(SchemaPathElem::Field("directions"));
        p.push(SchemaPathElem::Index(di));
        let ok = match direction.kind {
            DirectionKind::Text => direction
                .data
                .as_deref()
                .is_some_and(|d| !d.trim().is_empty()),
            _ => direction
                .asset
                .as_ref()
                .is_some_and(|a| !a.key.trim().is_empty()),
        };
        if !ok {
            let msg = match direction.kind {
                DirectionKind::Text => "text direction needs non-empty data",
                _ => "direction needs an asset with a non-empty key",
            };
            issues.push(SchemaIssue::at(&p, id, msg));
        }
    }

    if let Some(video) = &block.video {
        let mut p = path.clone();
        p.push(SchemaPathElem::Field("video"));
        validate_video(story, video, &p, id, issues);
    }
}

fn validate_video(
    story: &StoryDescriptor,
    video: &VideoDirection,
    path: &[SchemaPathElem],
    block: Option<&str>,
    issues: &mut Vec<SchemaIssue>,
) {
    let Some(meta) = story.metadata.videos.get(&video.id) else {
        issues.push(SchemaIssue::at(
            path,
            block,
            format!("video '{}' is not declared in metadata", video.id),
        ));
        return;
    };
    if video.segments.is_empty() {
        issues.push(SchemaIssue::at(
            path,
            block,
            "video direction needs at least one segment",
        ));
    }
    for (si, seg_id) in video.segments.iter().enumerate() {
        if !meta.transcription.contains_key(seg_id) {
            let mut p = path.to_vec();
            p.push(SchemaPathElem::Field("segments"));
            p.push(SchemaPathElem::Index(si));
            issues.push(SchemaIssue::at(
                &p,
                block,
                format!("segment '{seg_id}' is not in the transcription of '{}'", video.id),
            ));
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/story/validate.rs"]
mod tests;
