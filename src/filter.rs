use crate::models::Platform;

/// Which platform column groups a report shows.
///
/// Only a single selected platform narrows the report; no flags or two
/// flags show every platform. Setting the third flag clears them all, so
/// an explicit three-platform selection cannot exist.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PlatformFilter {
    selected: [bool; 3],
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Choice {
    All,
    Platform(Platform),
}

impl PlatformFilter {
    pub fn all() -> Self {
        Self::default()
    }

    #[cfg(test)]
    pub fn only(platform: Platform) -> Self {
        Self::all().toggle(Choice::Platform(platform))
    }

    pub fn from_choices<I>(choices: I) -> Self
    where
        I: IntoIterator<Item = Choice>,
    {
        choices
            .into_iter()
            .fold(Self::all(), |filter, choice| filter.select(choice))
    }

    /// Picking a platform that is already on turns it off; picking All clears every flag.
    pub fn toggle(self, choice: Choice) -> Self {
        match choice {
            Choice::All => Self::all(),
            Choice::Platform(platform) => {
                let mut selected = self.selected;
                selected[platform as usize] = !selected[platform as usize];
                Self::collapse(selected)
            }
        }
    }

    /// Like [`toggle`](Self::toggle) but never deselects; used for repeated CLI flags.
    fn select(self, choice: Choice) -> Self {
        match choice {
            Choice::All => Self::all(),
            Choice::Platform(platform) if self.includes_explicitly(platform) => self,
            Choice::Platform(_) => self.toggle(choice),
        }
    }

    fn collapse(selected: [bool; 3]) -> Self {
        if selected.iter().all(|flag| *flag) {
            Self::all()
        } else {
            Self { selected }
        }
    }

    fn includes_explicitly(&self, platform: Platform) -> bool {
        self.selected[platform as usize]
    }

    fn single(&self) -> Option<Platform> {
        let mut chosen = Platform::ALL
            .into_iter()
            .filter(|platform| self.includes_explicitly(*platform));
        match (chosen.next(), chosen.next()) {
            (Some(platform), None) => Some(platform),
            _ => None,
        }
    }

    pub fn is_all(&self) -> bool {
        self.single().is_none()
    }

    pub fn includes(&self, platform: Platform) -> bool {
        self.single().map_or(true, |chosen| chosen == platform)
    }

    /// Active platforms in column order.
    pub fn active(&self) -> Vec<Platform> {
        Platform::ALL
            .into_iter()
            .filter(|platform| self.includes(*platform))
            .collect()
    }

    pub fn describe(&self) -> String {
        if self.is_all() {
            return "all platforms".to_string();
        }
        self.active()
            .into_iter()
            .map(Platform::label)
            .collect::<Vec<_>>()
            .join(", ")
    }
}
