use crate::domain::OrderStatus;

/// Known provider wordings per canonical status. Matching is containment
/// in both directions: providers wrap the status in extra words, and some
/// callbacks truncate it ("eclined" has been seen in the wild).
const SYNONYMS: &[(OrderStatus, &[&str])] = &[
    (
        OrderStatus::Succeeded,
        &["confirmed", "completed", "succeeded", "success"],
    ),
    (OrderStatus::Canceled, &["canceled", "order_canceled"]),
    (
        OrderStatus::Rejected,
        &["rejected", "declined", "order_denied"],
    ),
    (OrderStatus::Expired, &["deadline_expired"]),
];

/// Maps a raw provider status token to a canonical status. Empty or
/// unrecognized input stays `pending`: missing data must never invent a
/// terminal state.
pub fn normalize(raw: &str) -> OrderStatus {
    let needle = raw.trim().to_lowercase();
    if needle.is_empty() {
        return OrderStatus::Pending;
    }

    for (status, synonyms) in SYNONYMS {
        for synonym in *synonyms {
            if needle.contains(synonym) || synonym.contains(needle.as_str()) {
                return *status;
            }
        }
    }

    OrderStatus::Pending
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalizes_every_known_provider_wording() {
        let cases = [
            ("CONFIRMED", OrderStatus::Succeeded),
            ("confirmed", OrderStatus::Succeeded),
            ("conFirmed", OrderStatus::Succeeded),
            ("Completed", OrderStatus::Succeeded),
            ("completed", OrderStatus::Succeeded),
            ("succeeded", OrderStatus::Succeeded),
            ("success", OrderStatus::Succeeded),
            ("canceled", OrderStatus::Canceled),
            ("Canceled", OrderStatus::Canceled),
            ("order_canceled", OrderStatus::Canceled),
            ("order_denied", OrderStatus::Rejected),
            ("Declined", OrderStatus::Rejected),
            ("eclined", OrderStatus::Rejected),
            ("REJECTED", OrderStatus::Rejected),
            ("rejected", OrderStatus::Rejected),
            ("DEADLINE_EXPIRED", OrderStatus::Expired),
            ("", OrderStatus::Pending),
            (".", OrderStatus::Pending),
            ("sdfsdfsf", OrderStatus::Pending),
        ];

        for (raw, want) in cases {
            assert_eq!(normalize(raw), want, "status {:?} should be {:?}", raw, want);
        }
    }

    #[test]
    fn surrounding_words_still_match() {
        assert_eq!(normalize("payment CONFIRMED ok"), OrderStatus::Succeeded);
        assert_eq!(normalize("state: order_canceled"), OrderStatus::Canceled);
    }
}
