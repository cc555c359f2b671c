//! Statistics over the raw inputs, before any cleaning

use anyhow::Result;
use polars::prelude::*;
use serde::Serialize;

use super::frame::{count_any_present, count_nonzero};
use super::loader::RawTables;

/// Number of graph API queries issued per article
pub const QUERIES_PER_ARTICLE: usize = 10;

/// Third-party aggregator source
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct AltmetricStats {
    pub rows: usize,
    /// Rows with at least one value
    pub non_empty: usize,
    pub with_posts: usize,
    pub with_tweets: usize,
}

/// Graph API count source
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct GraphApiStats {
    pub rows: usize,
    /// Rows with at least one value
    pub non_empty: usize,
    pub with_shares: usize,
    pub with_reactions: usize,
    pub with_comments: usize,
    /// `None` when the file has no plugin_comments column
    pub with_plugin_comments: Option<usize>,
}

/// Everything reported about the raw inputs
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct InputStats {
    pub altmetric: AltmetricStats,
    pub graph_api: GraphApiStats,
    /// Articles with at least one non-zero share, reaction or comment
    pub articles_with_engagement: usize,
    pub responses: usize,
    /// Responses as a percentage of the queries issued for all articles
    pub response_rate_pct: f64,
    /// Responses whose reactions, shares and comments sum to zero
    pub zero_engagement_responses: usize,
    pub zero_engagement_pct: f64,
    pub articles: usize,
    pub articles_with_metrics: usize,
}

/// Collect statistics over freshly loaded tables.
pub fn collect_input_stats(raw: &RawTables) -> Result<InputStats> {
    let am = &raw.am_metrics;
    let altmetric = AltmetricStats {
        rows: am.height(),
        non_empty: count_any_present(am, &["facebook", "twitter"])?,
        with_posts: count_nonzero(am, "facebook")?,
        with_tweets: count_nonzero(am, "twitter")?,
    };

    let fb = &raw.fb_metrics;
    let has_plugin = fb.get_column_index("plugin_comments").is_some();
    let mut fb_columns = vec!["shares", "reactions", "comments"];
    if has_plugin {
        fb_columns.push("plugin_comments");
    }
    let graph_api = GraphApiStats {
        rows: fb.height(),
        non_empty: count_any_present(fb, &fb_columns)?,
        with_shares: count_nonzero(fb, "shares")?,
        with_reactions: count_nonzero(fb, "reactions")?,
        with_comments: count_nonzero(fb, "comments")?,
        with_plugin_comments: if has_plugin {
            Some(count_nonzero(fb, "plugin_comments")?)
        } else {
            None
        },
    };

    let responses = raw.responses.height();
    let zero_engagement_responses = count_zero_engagement(&raw.responses)?;
    let articles = raw.articles.height();

    Ok(InputStats {
        altmetric,
        graph_api,
        articles_with_engagement: count_engaged_articles(&raw.metrics)?,
        responses,
        response_rate_pct: percentage(responses, articles * QUERIES_PER_ARTICLE),
        zero_engagement_responses,
        zero_engagement_pct: percentage(zero_engagement_responses, responses),
        articles,
        articles_with_metrics: raw.metrics.height(),
    })
}

/// `part` as a percentage of `whole`, 0 when `whole` is 0.
pub fn percentage(part: usize, whole: usize) -> f64 {
    if whole == 0 {
        0.0
    } else {
        100.0 * part as f64 / whole as f64
    }
}

fn count_zero_engagement(responses: &DataFrame) -> Result<usize> {
    let summed = responses
        .clone()
        .lazy()
        .select([(col("reactions").fill_null(lit(0.0))
            + col("shares").fill_null(lit(0.0))
            + col("comments").fill_null(lit(0.0)))
        .alias("engagement")])
        .collect()?;
    Ok(summed
        .column("engagement")?
        .f64()?
        .into_iter()
        .filter(|v| *v == Some(0.0))
        .count())
}

fn count_engaged_articles(metrics: &DataFrame) -> Result<usize> {
    let columns = ["shares", "reactions", "comments"];
    let mut engaged = vec![false; metrics.height()];
    for name in columns {
        let values = metrics.column(name)?.cast(&DataType::Float64)?;
        for (flag, value) in engaged.iter_mut().zip(values.f64()?.into_iter()) {
            if value.is_some_and(|v| v != 0.0 && !v.is_nan()) {
                *flag = true;
            }
        }
    }
    Ok(engaged.into_iter().filter(|e| *e).count())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_percentage() {
        assert_eq!(percentage(1, 4), 25.0);
        assert_eq!(percentage(3, 0), 0.0);
    }

    #[test]
    fn test_count_zero_engagement_treats_null_as_zero() {
        let df = df! {
            "reactions" => [Some(0.0f64), None, Some(1.0)],
            "shares" => [Some(0.0f64), Some(0.0), None],
            "comments" => [None::<f64>, None, None],
        }
        .unwrap();
        assert_eq!(count_zero_engagement(&df).unwrap(), 2);
    }
}
