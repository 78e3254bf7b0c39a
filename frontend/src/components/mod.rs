pub mod browser_view;
pub mod leaflet_map;
pub mod panel;
