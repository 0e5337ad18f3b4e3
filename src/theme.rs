use serde::Serialize;
use tokio::sync::broadcast;

const THEME_CHANNEL_CAPACITY: usize = 16;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ThemeMode {
    Light,
    Dark,
}

impl ThemeMode {
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "light" => Some(Self::Light),
            "dark" => Some(Self::Dark),
            _ => None,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ThemeEvent {
    pub mode: ThemeMode,
}

/// Explicit notification interface between the page theme toggle and the
/// ambient background service. The game core never touches this; interested
/// services subscribe and react on their own schedule.
pub struct ThemeNotifier {
    mode: ThemeMode,
    sender: broadcast::Sender<ThemeEvent>,
}

impl ThemeNotifier {
    pub fn new() -> Self {
        let (sender, _) = broadcast::channel(THEME_CHANNEL_CAPACITY);
        Self {
            mode: ThemeMode::Light,
            sender,
        }
    }

    pub fn mode(&self) -> ThemeMode {
        self.mode
    }

    pub fn subscribe(&self) -> broadcast::Receiver<ThemeEvent> {
        self.sender.subscribe()
    }

    pub fn set_mode(&mut self, mode: ThemeMode) {
        if mode == self.mode {
            return;
        }
        self.mode = mode;
        let _ = self.sender.send(ThemeEvent { mode });
    }
}

impl Default for ThemeNotifier {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::{ThemeEvent, ThemeMode, ThemeNotifier};

    #[test]
    fn subscribers_receive_mode_changes() {
        let mut notifier = ThemeNotifier::new();
        let mut receiver = notifier.subscribe();

        notifier.set_mode(ThemeMode::Dark);
        assert_eq!(
            receiver.try_recv().expect("event delivered"),
            ThemeEvent {
                mode: ThemeMode::Dark
            }
        );
        assert_eq!(notifier.mode(), ThemeMode::Dark);
    }

    #[test]
    fn repeating_the_current_mode_emits_nothing() {
        let mut notifier = ThemeNotifier::new();
        let mut receiver = notifier.subscribe();

        notifier.set_mode(ThemeMode::Light);
        assert!(receiver.try_recv().is_err());
    }

    #[test]
    fn late_subscribers_only_see_later_changes() {
        let mut notifier = ThemeNotifier::new();
        notifier.set_mode(ThemeMode::Dark);

        let mut receiver = notifier.subscribe();
        assert!(receiver.try_recv().is_err());

        notifier.set_mode(ThemeMode::Light);
        assert_eq!(
            receiver.try_recv().expect("event delivered"),
            ThemeEvent {
                mode: ThemeMode::Light
            }
        );
    }

    #[test]
    fn parse_accepts_only_known_modes() {
        assert_eq!(ThemeMode::parse("light"), Some(ThemeMode::Light));
        assert_eq!(ThemeMode::parse("dark"), Some(ThemeMode::Dark));
        assert_eq!(ThemeMode::parse("midnight"), None);
    }
}
