pub const WELCOME_SUBJECT: &str = "Thanks for joining the waitlist!";

const WELCOME_TEMPLATE: &str = include_str!("../../../views/welcome_email.html");

pub fn get_email_text(email: &str, site_url: &str) -> String {
    format!(
        "You're on the list!

Thanks for signing up for early access.
We'll email you when we launch and when the beta is ready.

If you want to share your pain points, just reply to this email.

You received this because {email} signed up at {site_url}."
    )
}

pub fn get_email_html(email: &str, site_url: &str) -> Result<String, tera::Error> {
    let mut ctx = tera::Context::new();
    ctx.insert("email", email);
    ctx.insert("site_url", site_url);
    tera::Tera::one_off(WELCOME_TEMPLATE, &ctx, true)
}
