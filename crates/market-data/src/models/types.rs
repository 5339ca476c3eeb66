use std::borrow::Cow;

/// Provider identifier - mostly static constants ("FMP", "TWELVE_DATA", "LOCAL")
pub type ProviderId = Cow<'static, str>;
