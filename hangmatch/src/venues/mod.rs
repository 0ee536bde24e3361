mod tavily;

pub use tavily::VenueSearchProvider;
