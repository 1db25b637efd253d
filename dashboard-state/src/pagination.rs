use serde::Serialize;

const MAX_VISIBLE_PAGES: u32 = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum PageMarker {
    Page(u32),
    Ellipsis,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
/// Одна страница клиентской пагинации.
pub struct Page<T> {
    pub items: Vec<T>,
    pub current_page: u32,
    pub items_per_page: u32,
    pub total_items: usize,
    pub total_pages: u32,
    /// Номер первой показанной записи (с единицы), 0 для пустой выборки.
    pub first_item: usize,
    pub last_item: usize,
}

impl<T> Page<T> {
    pub fn window(&self) -> Vec<PageMarker> {
        page_window(self.current_page, self.total_pages)
    }
}

/// Вырезает страницу `current_page` (с единицы) из полностью загруженной выборки.
pub fn paginate<T: Clone>(items: &[T], current_page: u32, items_per_page: u32) -> Page<T> {
    let current_page = current_page.max(1);
    let items_per_page = items_per_page.max(1);
    let per_page = items_per_page as usize;
    let total_items = items.len();
    let total_pages = total_items.div_ceil(per_page) as u32;

    let start = (current_page as usize - 1).saturating_mul(per_page);
    let page_items: Vec<T> = items.iter().skip(start).take(per_page).cloned().collect();

    let (first_item, last_item) = if page_items.is_empty() {
        (0, 0)
    } else {
        (start + 1, start + page_items.len())
    };

    Page {
        items: page_items,
        current_page,
        items_per_page,
        total_items,
        total_pages,
        first_item,
        last_item,
    }
}

/// Номера страниц для навигации, с многоточиями вместо длинных промежутков.
pub fn page_window(current_page: u32, total_pages: u32) -> Vec<PageMarker> {
    if total_pages <= MAX_VISIBLE_PAGES {
        return (1..=total_pages).map(PageMarker::Page).collect();
    }

    let mut markers = Vec::with_capacity(7);
    if current_page <= 3 {
        markers.extend((1..=4).map(PageMarker::Page));
        markers.push(PageMarker::Ellipsis);
        markers.push(PageMarker::Page(total_pages));
    } else if current_page >= total_pages - 2 {
        markers.push(PageMarker::Page(1));
        markers.push(PageMarker::Ellipsis);
        markers.extend((total_pages - 3..=total_pages).map(PageMarker::Page));
    } else {
        markers.push(PageMarker::Page(1));
        markers.push(PageMarker::Ellipsis);
        markers.extend((current_page - 1..=current_page + 1).map(PageMarker::Page));
        markers.push(PageMarker::Ellipsis);
        markers.push(PageMarker::Page(total_pages));
    }
    markers
}
