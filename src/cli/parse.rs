use blockport_core::naming::clean_tag_input;
use blockport_core::render::{BlockSpacing, LevelIndicator, LevelSpacing};

/// Parse a tag given as `tag`, `#tag`, `[[tag]]` or `#[[tag]]`
pub fn parse_tag(s: &str) -> std::result::Result<String, String> {
    clean_tag_input(s).ok_or_else(|| "tag must not be empty".to_string())
}

/// Parse block spacing from string
pub fn parse_block_spacing(s: &str) -> std::result::Result<BlockSpacing, String> {
    s.parse::<BlockSpacing>().map_err(|e| e.to_string())
}

/// Parse level spacing from string
pub fn parse_level_spacing(s: &str) -> std::result::Result<LevelSpacing, String> {
    s.parse::<LevelSpacing>().map_err(|e| e.to_string())
}

/// Parse level indicator from string
pub fn parse_level_indicator(s: &str) -> std::result::Result<LevelIndicator, String> {
    s.parse::<LevelIndicator>().map_err(|e| e.to_string())
}
