//! Robots.txt interpretation
//!
//! Only one question is asked of a robots.txt file: does it contain a blanket
//! `Disallow: /` rule? User-agent groups, path-specific rules and `Allow`
//! lines are not interpreted.

/// Parsed robots.txt data
#[derive(Debug, Clone)]
pub struct RobotsPolicy {
    /// Whether a `Disallow: /` line was found
    blocks_everything: bool,
}

impl RobotsPolicy {
    /// Creates a policy from raw robots.txt content
    ///
    /// # Arguments
    ///
    /// * `content` - The raw robots.txt file content
    ///
    /// # Returns
    ///
    /// A RobotsPolicy that can be asked whether crawling is permitted
    pub fn from_content(content: &str) -> Self {
        Self {
            blocks_everything: content.lines().any(is_blanket_disallow),
        }
    }

    /// Returns true if the file forbids crawling the whole site
    pub fn blocks_everything(&self) -> bool {
        self.blocks_everything
    }
}

/// Checks a single line for `Disallow: /`
///
/// Keys are case-insensitive, whitespace around the key and value is ignored
/// and trailing `#` comments are stripped. The value must be exactly `/`.
fn is_blanket_disallow(line: &str) -> bool {
    let line = match line.split_once('#') {
        Some((before, _)) => before,
        None => line,
    };

    match line.split_once(':') {
        Some((key, value)) => key.trim().eq_ignore_ascii_case("disallow") && value.trim() == "/",
        None => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_file_is_allowed() {
        assert!(!RobotsPolicy::from_content("").blocks_everything());
    }

    #[test]
    fn test_parse_disallow_all() {
        let robots = RobotsPolicy::from_content("User-agent: *\nDisallow: /");
        assert!(robots.blocks_everything());
    }

    #[test]
    fn test_parse_disallow_specific_path_is_allowed() {
        let robots = RobotsPolicy::from_content("User-agent: *\nDisallow: /admin");
        assert!(!robots.blocks_everything());
    }

    #[test]
    fn test_empty_disallow_is_allowed() {
        let robots = RobotsPolicy::from_content("User-agent: *\nDisallow:");
        assert!(!robots.blocks_everything());
    }

    #[test]
    fn test_case_whitespace_and_comments() {
        assert!(RobotsPolicy::from_content("  disallow :   /   # everything").blocks_everything());
        assert!(RobotsPolicy::from_content("DISALLOW: /\r\n").blocks_everything());
    }

    #[test]
    fn test_commented_out_rule_is_ignored() {
        let robots = RobotsPolicy::from_content("# Disallow: /\nUser-agent: *\nAllow: /");
        assert!(!robots.blocks_everything());
    }

    #[test]
    fn test_user_agent_groups_are_not_interpreted() {
        // A blanket rule for any agent counts as a denial
        let content = "User-agent: BadBot\nDisallow: /\n\nUser-agent: *\nAllow: /";
        assert!(RobotsPolicy::from_content(content).blocks_everything());
    }

    #[test]
    fn test_garbage_content_is_allowed() {
        let robots = RobotsPolicy::from_content("<html>not a robots file</html>");
        assert!(!robots.blocks_everything());
    }
}
