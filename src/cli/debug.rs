use tabled::Table;

use crate::{config::Config, types::ConfigTableRow, utils::mask_secret};

fn row(key: &str, value: impl ToString) -> ConfigTableRow {
    ConfigTableRow {
        key: key.to_string(),
        value: value.to_string(),
    }
}

/// Table of the effective configuration, secrets masked.
pub fn config_table(config: &Config) -> Table {
    let mut rows = vec![
        row("DL_RETRIES", config.download_retry.attempts),
        row("DL_DELAY", config.download_retry.delay.as_secs()),
        row("MSG_RETRIES", config.message_retry.attempts),
        row("MSG_DELAY", config.message_retry.delay.as_secs()),
        row("LOCALE", &config.locale),
        row("LB_USER", &config.lb_user),
        row("LB_FETCH", config.lb_fetch),
        row("LB_VERIFIED", config.lb_verified),
    ];

    match &config.mastodon {
        Some(mastodon) => {
            rows.push(row("MA_INSTANCE", &mastodon.instance));
            rows.push(row("MA_TOKEN", mask_secret(&mastodon.token)));
        }
        None => rows.push(row("MASTODON", "not configured")),
    }

    match &config.twitter {
        Some(twitter) => {
            rows.push(row("TW_CONSUMER_KEY", mask_secret(&twitter.consumer_key)));
            rows.push(row("TW_CONSUMER_SECRET", mask_secret(&twitter.consumer_secret)));
            rows.push(row("TW_ACCESS_TOKEN", mask_secret(&twitter.access_token)));
            rows.push(row(
                "TW_ACCESS_TOKEN_SECRET",
                mask_secret(&twitter.access_token_secret),
            ));
        }
        None => rows.push(row("TWITTER", "not configured")),
    }

    Table::new(rows)
}
