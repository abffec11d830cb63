use std::fmt;
use std::str::FromStr;

use crate::api::ListQuery;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum PageSize {
    Three,
    Five,
    #[default]
    Ten,
    Twenty,
    Fifty,
}

impl PageSize {
    pub const ALL: [PageSize; 5] = [
        PageSize::Three,
        PageSize::Five,
        PageSize::Ten,
        PageSize::Twenty,
        PageSize::Fifty,
    ];

    pub fn get(self) -> u32 {
        match self {
            PageSize::Three => 3,
            PageSize::Five => 5,
            PageSize::Ten => 10,
            PageSize::Twenty => 20,
            PageSize::Fifty => 50,
        }
    }

    pub fn from_count(count: u32) -> Option<Self> {
        Self::ALL.into_iter().find(|s| s.get() == count)
    }
}

impl fmt::Display for PageSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.get())
    }
}

impl FromStr for PageSize {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let count: u32 = s
            .trim()
            .parse()
            .map_err(|_| format!("invalid page size '{}'", s.trim()))?;
        Self::from_count(count).ok_or_else(|| {
            let allowed: Vec<String> = Self::ALL.iter().map(|s| s.to_string()).collect();
            format!(
                "invalid page size {count}, expected one of {}",
                allowed.join(", ")
            )
        })
    }
}

/// Search and pagination parameters for the next listing request.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Filter {
    pub phone_substring: String,
    pub name_substring: String,
    page: u32,
    pub page_size: PageSize,
}

impl Default for Filter {
    fn default() -> Self {
        Self {
            phone_substring: String::new(),
            name_substring: String::new(),
            page: 1,
            page_size: PageSize::default(),
        }
    }
}

impl Filter {
    /// First page of everything at the given size.
    pub fn with_page_size(page_size: PageSize) -> Self {
        Self {
            page_size,
            ..Self::default()
        }
    }

    pub fn page(&self) -> u32 {
        self.page
    }

    pub(crate) fn set_page(&mut self, page: u32) {
        self.page = page.max(1);
    }

    pub fn has_search(&self) -> bool {
        !self.phone_substring.is_empty() || !self.name_substring.is_empty()
    }

    pub fn to_query(&self) -> ListQuery {
        let non_empty = |s: &str| (!s.is_empty()).then(|| s.to_string());
        ListQuery {
            page: self.page,
            paginate: self.page_size.get(),
            phone_number_search: non_empty(&self.phone_substring),
            name_search: non_empty(&self.name_substring),
        }
    }
}
