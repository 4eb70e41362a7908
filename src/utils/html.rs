/// Sanitizes teacher-written feedback before it is stored.
///
/// Whitelist-based: safe tags such as <b> and <p> survive, while <script>,
/// <iframe> and event-handler attributes are stripped together with their content.
pub fn clean_html(input: &str) -> String {
    ammonia::clean(input)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clean_html_strips_scripts() {
        let cleaned = clean_html("<p>Good work</p><script>alert(1)</script>");
        assert_eq!(cleaned, "<p>Good work</p>");
    }
}
