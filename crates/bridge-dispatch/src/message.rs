//! Message rendering.

use bridge_config::TemplateConfig;
use bridge_core::{MatchKind, MatchRecord, Phone};

/// One text to one record member.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Outgoing {
    pub name: String,
    pub phone: Option<Phone>,
    pub wristband: Option<u32>,
    /// Wristband labels (`#12`) of the other members.
    pub partners: Vec<String>,
    pub body: String,
}

/// Renders the message each member of `record` receives.
///
/// Special and romantic records name the partner's wristband; friend
/// records name one partner, friend groups two.
pub fn messages_for(record: &MatchRecord, templates: &TemplateConfig) -> Vec<Outgoing> {
    record
        .members
        .iter()
        .map(|member| {
            let partners: Vec<String> = record
                .partners_of(&member.key)
                .map(|m| m.wristband_label())
                .collect();
            let body = match record.kind {
                MatchKind::Special | MatchKind::Romantic => templates
                    .match_message
                    .replace("{partner}", partners.first().map_or("#?", String::as_str)),
                MatchKind::Friend => templates
                    .friend_message
                    .replace("{partners}", &partners.join(" and ")),
                MatchKind::FriendGroup => templates
                    .friend_group_message
                    .replace("{partners}", &partners.join(" and ")),
            };
            Outgoing {
                name: member.name.clone(),
                phone: member.phone.clone(),
                wristband: member.wristband,
                partners,
                body,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use bridge_core::{BlockReason, MatchRecord};
    use bridge_test::guest;

    use super::*;

    #[test]
    fn test_romantic_message_names_partner() {
        let a = guest(1, "Ada").present(12);
        let b = guest(2, "Ben").present(40);
        let record = MatchRecord::pair(MatchKind::Romantic, &a, &b, 55);

        let messages = messages_for(&record, &TemplateConfig::default());

        assert_eq!(messages.len(), 2);
        assert_eq!(messages[0].body, "Your Bridge match is #40!");
        assert_eq!(messages[1].body, "Your Bridge match is #12!");
    }

    #[test]
    fn test_group_message_names_both_partners() {
        let a = guest(1, "Ada").present(1);
        let b = guest(2, "Ben").present(2);
        let c = guest(3, "Cy").present(3);
        let record = MatchRecord::friend(&a, &b, 0, BlockReason::GenderPreference).into_group(&c);

        let messages = messages_for(&record, &TemplateConfig::default());

        assert_eq!(messages.len(), 3);
        assert_eq!(messages[1].partners, vec!["#1", "#3"]);
        assert!(messages[1]
            .body
            .starts_with("We didn't find a romantic interest for you this round, but you'd make great friends with #1 and #3!"));
    }

    #[test]
    fn test_custom_templates() {
        let a = guest(1, "Ada").present(7);
        let b = guest(2, "Ben").present(8);
        let record = MatchRecord::friend(&a, &b, 0, BlockReason::GradeIncompatibility);
        let templates = TemplateConfig {
            friend_message: "Say hi to {partners}".into(),
            ..TemplateConfig::default()
        };

        let messages = messages_for(&record, &templates);
        assert_eq!(messages[0].body, "Say hi to #8");
    }
}
