use posters_core::services::verification::Channel;

use crate::dispatch::template::EMAIL_SUBJECT;
use crate::dispatch::MessageTemplate;

#[test]
fn test_email_template() {
    let template = MessageTemplate::for_channel(Channel::Email, 4);
    let (subject, body) = template.render("482913");

    assert_eq!(subject, "Posters Login Code.");
    assert_eq!(subject, EMAIL_SUBJECT);
    assert!(body.contains("482913"));
    assert!(body.contains("4 minutes"));
}

#[test]
fn test_sms_template_has_no_subject() {
    let template = MessageTemplate::for_channel(Channel::Sms, 1);
    let (subject, body) = template.render("0042");

    assert!(subject.is_empty());
    assert_eq!(body, "Posters login code: 0042. Expires in 1 minute.");
}
