//! Message templates for verification codes

use posters_core::services::verification::Channel;

/// Subject line of the login code email
pub const EMAIL_SUBJECT: &str = "Posters Login Code.";

/// Renders the subject and body that carry a code on one channel
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MessageTemplate {
    channel: Channel,
    lifetime_minutes: u64,
}

impl MessageTemplate {
    /// Template for `channel` stating that codes live `lifetime_minutes`
    pub fn for_channel(channel: Channel, lifetime_minutes: u64) -> Self {
        Self {
            channel,
            lifetime_minutes,
        }
    }

    pub fn channel(&self) -> Channel {
        self.channel
    }

    /// Render `(subject, body)` for a code
    pub fn render(&self, code: &str) -> (String, String) {
        let minutes = self.lifetime_minutes;
        let unit = if minutes == 1 { "minute" } else { "minutes" };

        match self.channel {
            Channel::Email => (
                EMAIL_SUBJECT.to_string(),
                format!(
                    "Hello,\n\n\
                     Use the code below to sign in to Posters:\n\n\
                     {code}\n\n\
                     The code expires in {minutes} {unit}. \
                     If you did not request it, you can ignore this email.\n"
                ),
            ),
            // SMS has no subject line
            Channel::Sms => (
                String::new(),
                format!("Posters login code: {code}. Expires in {minutes} {unit}."),
            ),
        }
    }
}
