/// Test data for digest integration tests
/// Contains RSS samples and completion-endpoint responses shared across tests

pub const FRONT_PAGE_RSS: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<rss version="2.0">
    <channel>
        <title>Front Page</title>
        <description>Top stories</description>
        <link>https://news.example.com</link>

        <item>
            <title>Alpha Story</title>
            <link>https://news.example.com/alpha</link>
            <description><![CDATA[<p>Points: 120</p><p># Comments: 44</p>]]></description>
            <comments>https://news.example.com/alpha/comments</comments>
        </item>

        <item>
            <title>Beta Story</title>
            <link>https://news.example.com/beta</link>
            <description>Plain beta description</description>
            <comments>https://news.example.com/beta/comments</comments>
        </item>

        <item>
            <title>Gamma Story</title>
            <link>https://news.example.com/gamma</link>
            <description>Plain gamma description</description>
            <comments>https://news.example.com/gamma/comments</comments>
        </item>
    </channel>
</rss>"#;

pub const GAPPY_RSS: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<rss version="2.0">
    <channel>
        <title>Gappy Feed</title>
        <description>Some items are unusable</description>
        <link>https://news.example.com</link>

        <item>
            <title>First Valid</title>
            <link>https://news.example.com/first</link>
            <description>fine</description>
        </item>

        <item>
            <link>https://news.example.com/no-title</link>
            <description>missing a title</description>
        </item>

        <item>
            <title>No Link Here</title>
            <description>missing a link</description>
        </item>

        <item>
            <title>Fourth Valid</title>
            <link>https://news.example.com/fourth</link>
            <description>also fine</description>
        </item>
    </channel>
</rss>"#;

pub const MALFORMED_XML: &str = r#"<?xml version="1.0"?>
<rss version="2.0">
    <channel>
        <title>Broken Feed</title>
        <item>
            <title>Unclosed tag
        </item>
    </channel>
    <!-- Missing closing rss tag -->"#;

/// Build a feed with `count` items titled "Item 1" through "Item {count}".
pub fn feed_with_items(count: usize) -> String {
    let mut feed = String::from(
        r#"<?xml version="1.0" encoding="UTF-8"?>
<rss version="2.0">
    <channel>
        <title>Generated Feed</title>
        <description>A generated feed</description>
        <link>https://news.example.com</link>"#,
    );

    for i in 1..=count {
        feed.push_str(&format!(
            r#"
        <item>
            <title>Item {i}</title>
            <link>https://news.example.com/item-{i}</link>
            <description>Description {i}</description>
            <comments>https://news.example.com/item-{i}/comments</comments>
        </item>"#
        ));
    }

    feed.push_str("\n    </channel>\n</rss>");
    feed
}

/// A chat-completions response body carrying one choice.
pub fn completion_body(text: &str) -> serde_json::Value {
    serde_json::json!({
        "id": "chatcmpl-test",
        "object": "chat.completion",
        "choices": [
            {
                "index": 0,
                "message": { "role": "assistant", "content": text },
                "finish_reason": "stop"
            }
        ]
    })
}
