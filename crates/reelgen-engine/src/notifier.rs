use reelgen_contracts::ui::Notification;

/// The one surface for transient messages.
pub trait Notifier {
    fn notify(&mut self, notification: &Notification);
}

impl<F> Notifier for F
where
    F: FnMut(&Notification),
{
    fn notify(&mut self, notification: &Notification) {
        self(notification)
    }
}
