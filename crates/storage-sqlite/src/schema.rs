diesel::table! {
    client_profile (client) {
        client -> Text,
        target_portfolio -> Text,
    }
}

diesel::table! {
    asset_performance (symbol) {
        symbol -> Text,
        name -> Nullable<Text>,
        sector -> Nullable<Text>,
        current_price -> Nullable<Text>,
        dividend_yield -> Nullable<Text>,
        pe_ratio -> Nullable<Text>,
        week_52_high -> Nullable<Text>,
        week_52_low -> Nullable<Text>,
        analyst_rating -> Nullable<Text>,
        target_price -> Nullable<Text>,
        risk_level -> Nullable<Text>,
    }
}

diesel::table! {
    client_allocation (client, symbol) {
        client -> Text,
        symbol -> Text,
        quantity -> Text,
        buy_price -> Nullable<Text>,
        purchase_date -> Nullable<Text>,
    }
}

diesel::table! {
    target_allocation (client, asset_class) {
        client -> Text,
        asset_class -> Text,
        target_allocation_percent -> Text,
    }
}

diesel::allow_tables_to_appear_in_same_query!(
    client_profile,
    asset_performance,
    client_allocation,
    target_allocation,
);
