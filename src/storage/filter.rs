use crate::feed::Article;

/// Apply a feed's whitelist and blacklist to `articles`.
///
/// A word matches an article when it occurs, ignoring case, anywhere in the
/// article's title, description and content taken together. With a non-empty
/// whitelist only articles matching at least one whitelist word survive; any
/// article matching a blacklist word is dropped. Blank words are ignored and
/// an empty list imposes no restriction. Survivors keep their input order and
/// the input is never modified.
pub fn filter_articles<W, B>(articles: &[Article], whitelist_words: &[W], blacklist_words: &[B]) -> Vec<Article>
where
    W: AsRef<str>,
    B: AsRef<str>,
{
    let whitelist = normalize_words(whitelist_words);
    let blacklist = normalize_words(blacklist_words);

    if whitelist.is_empty() && blacklist.is_empty() {
        return articles.to_vec();
    }

    articles
        .iter()
        .filter(|article| {
            let text = article.searchable_text();
            let whitelisted = whitelist.is_empty() || whitelist.iter().any(|word| text.contains(word.as_str()));
            whitelisted && !blacklist.iter().any(|word| text.contains(word.as_str()))
        })
        .cloned()
        .collect()
}

fn normalize_words<S: AsRef<str>>(words: &[S]) -> Vec<String> {
    words
        .iter()
        .map(|word| word.as_ref())
        .filter(|word| !word.trim().is_empty())
        .map(str::to_lowercase)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    const NONE: [&str; 0] = [];

    fn sample_articles() -> Vec<Article> {
        vec![
            Article::new("Samuel on enzymes", "Lab notes", "# Samuel on enzymes"),
            Article::new("Tide pools", "A walk along the shore", "# Tide pools"),
            Article::new("Guest episode", "Featuring SAMUEL again", "Sponsored by Acme"),
            Article::new("Coral reefs", "Sponsored content", "# Coral reefs"),
        ]
    }

    fn titles(articles: &[Article]) -> Vec<&str> {
        articles.iter().map(|a| a.title.as_str()).collect()
    }

    #[test]
    fn test_no_words_returns_everything() {
        let articles = sample_articles();
        assert_eq!(filter_articles(&articles, &NONE, &NONE), articles);
    }

    #[test]
    fn test_whitelist_is_case_insensitive() {
        let articles = sample_articles();

        for word in ["Samuel", "samuel", "SAMUEL"] {
            let filtered = filter_articles(&articles, &[word], &NONE);
            assert_eq!(titles(&filtered), vec!["Samuel on enzymes", "Guest episode"]);
        }
    }

    #[test]
    fn test_whitelist_matches_any_word() {
        let articles = sample_articles();
        let filtered = filter_articles(&articles, &["tide", "coral"], &NONE);
        assert_eq!(titles(&filtered), vec!["Tide pools", "Coral reefs"]);
    }

    #[test]
    fn test_blacklist_drops_matches() {
        let articles = sample_articles();
        let filtered = filter_articles(&articles, &NONE, &["sponsored"]);
        assert_eq!(titles(&filtered), vec!["Samuel on enzymes", "Tide pools"]);
    }

    #[test]
    fn test_whitelist_and_blacklist_combine() {
        let articles = sample_articles();
        let filtered = filter_articles(&articles, &["samuel"], &["acme"]);
        assert_eq!(titles(&filtered), vec!["Samuel on enzymes"]);
    }

    #[test]
    fn test_everything_filtered_is_empty_not_error() {
        let articles = sample_articles();
        assert!(filter_articles(&articles, &["nonexistent"], &NONE).is_empty());
        assert!(filter_articles(&articles, &NONE, &["e"]).is_empty());
    }

    #[test]
    fn test_blank_words_are_ignored() {
        let articles = sample_articles();
        assert_eq!(filter_articles(&articles, &[""], &["  "]), articles);
    }

    #[test]
    fn test_matches_across_field_boundaries() {
        let articles = vec![Article::new("end of tit", "le begins", "")];
        assert_eq!(filter_articles(&articles, &["title"], &NONE).len(), 1);
    }

    fn arb_article() -> impl Strategy<Value = Article> {
        ("[a-zA-Z ]{0,12}", "[a-zA-Z ]{0,12}", "[a-zA-Z ]{0,12}")
            .prop_map(|(title, description, content)| Article::new(title, description, content))
    }

    proptest! {
        #[test]
        fn prop_filtering_preserves_order_and_input(
            articles in prop::collection::vec(arb_article(), 0..20),
            whitelist in prop::collection::vec("[a-z]{1,3}", 0..3),
            blacklist in prop::collection::vec("[a-z]{1,3}", 0..3),
        ) {
            let original = articles.clone();
            let filtered = filter_articles(&articles, &whitelist, &blacklist);

            prop_assert_eq!(&articles, &original);
            prop_assert!(filtered.len() <= articles.len());

            // survivors appear in the same relative order as the input
            let mut remaining = articles.iter();
            for kept in &filtered {
                prop_assert!(remaining.any(|a| a == kept));
            }
        }

        #[test]
        fn prop_blacklisted_words_never_survive(
            articles in prop::collection::vec(arb_article(), 0..20),
            word in "[a-z]{1,3}",
        ) {
            let filtered = filter_articles(&articles, &NONE, &[word.as_str()]);
            for article in &filtered {
                prop_assert!(!article.searchable_text().contains(&word));
            }
            let matching = articles.iter().filter(|a| a.searchable_text().contains(&word)).count();
            prop_assert_eq!(filtered.len(), articles.len() - matching);
        }

        #[test]
        fn prop_whitelisted_words_always_present(
            articles in prop::collection::vec(arb_article(), 0..20),
            word in "[a-z]{1,3}",
        ) {
            let filtered = filter_articles(&articles, &[word.as_str()], &NONE);
            for article in &filtered {
                prop_assert!(article.searchable_text().contains(&word));
            }
            let matching = articles.iter().filter(|a| a.searchable_text().contains(&word)).count();
            prop_assert_eq!(filtered.len(), matching);
        }

        #[test]
        fn prop_filtering_is_idempotent(
            articles in prop::collection::vec(arb_article(), 0..20),
            whitelist in prop::collection::vec("[a-z]{1,3}", 0..3),
            blacklist in prop::collection::vec("[a-z]{1,3}", 0..3),
        ) {
            let once = filter_articles(&articles, &whitelist, &blacklist);
            let twice = filter_articles(&once, &whitelist, &blacklist);
            prop_assert_eq!(once, twice);
        }
    }
}
