/// Where a filtering request comes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct AdminSignal {
    /// The request is rendering an administrative backend page.
    pub is_admin: bool,
    /// The request is an asynchronous/background call (AJAX, REST).
    pub is_async: bool,
}

impl AdminSignal {
    /// A customer-facing storefront request.
    #[must_use]
    pub fn storefront() -> Self {
        Self::default()
    }

    /// An admin page render.
    #[must_use]
    pub fn admin_page() -> Self {
        Self {
            is_admin: true,
            is_async: false,
        }
    }

    /// An asynchronous call made from an admin page.
    #[must_use]
    pub fn admin_async() -> Self {
        Self {
            is_admin: true,
            is_async: true,
        }
    }
}
