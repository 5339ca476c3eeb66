//! Static instrument list served without network access.

pub(super) struct CatalogEntry {
    pub symbol: &'static str,
    pub name: &'static str,
    pub exchange: &'static str,
    pub currency: &'static str,
    pub sector: &'static str,
    pub country: &'static str,
}

const fn entry(
    symbol: &'static str,
    name: &'static str,
    exchange: &'static str,
    currency: &'static str,
    sector: &'static str,
    country: &'static str,
) -> CatalogEntry {
    CatalogEntry {
        symbol,
        name,
        exchange,
        currency,
        sector,
        country,
    }
}

pub(super) static CATALOG: &[CatalogEntry] = &[
    // India - NSE
    entry("RELIANCE.NS", "Reliance Industries Ltd", "NSE", "INR", "Energy", "India"),
    entry("TCS.NS", "Tata Consultancy Services Ltd", "NSE", "INR", "Information Technology", "India"),
    entry("HDFCBANK.NS", "HDFC Bank Ltd", "NSE", "INR", "Financial Services", "India"),
    entry("INFY.NS", "Infosys Ltd", "NSE", "INR", "Information Technology", "India"),
    entry("ICICIBANK.NS", "ICICI Bank Ltd", "NSE", "INR", "Financial Services", "India"),
    entry("HINDUNILVR.NS", "Hindustan Unilever Ltd", "NSE", "INR", "Consumer Goods", "India"),
    entry("SBIN.NS", "State Bank of India", "NSE", "INR", "Financial Services", "India"),
    entry("BHARTIARTL.NS", "Bharti Airtel Ltd", "NSE", "INR", "Telecommunication", "India"),
    entry("ITC.NS", "ITC Ltd", "NSE", "INR", "Consumer Goods", "India"),
    entry("KOTAKBANK.NS", "Kotak Mahindra Bank Ltd", "NSE", "INR", "Financial Services", "India"),
    entry("LT.NS", "Larsen & Toubro Ltd", "NSE", "INR", "Construction", "India"),
    entry("WIPRO.NS", "Wipro Ltd", "NSE", "INR", "Information Technology", "India"),
    entry("HCLTECH.NS", "HCL Technologies Ltd", "NSE", "INR", "Information Technology", "India"),
    entry("ASIANPAINT.NS", "Asian Paints Ltd", "NSE", "INR", "Consumer Goods", "India"),
    entry("MARUTI.NS", "Maruti Suzuki India Ltd", "NSE", "INR", "Automobile", "India"),
    entry("TATAMOTORS.NS", "Tata Motors Ltd", "NSE", "INR", "Automobile", "India"),
    entry("TATASTEEL.NS", "Tata Steel Ltd", "NSE", "INR", "Metals & Mining", "India"),
    entry("SUNPHARMA.NS", "Sun Pharmaceutical Industries Ltd", "NSE", "INR", "Healthcare", "India"),
    entry("BAJFINANCE.NS", "Bajaj Finance Ltd", "NSE", "INR", "Financial Services", "India"),
    entry("ADANIENT.NS", "Adani Enterprises Ltd", "NSE", "INR", "Metals & Mining", "India"),
    entry("ONGC.NS", "Oil & Natural Gas Corporation Ltd", "NSE", "INR", "Energy", "India"),
    entry("NTPC.NS", "NTPC Ltd", "NSE", "INR", "Power", "India"),
    entry("TITAN.NS", "Titan Company Ltd", "NSE", "INR", "Consumer Goods", "India"),
    entry("ZOMATO.NS", "Zomato Ltd", "NSE", "INR", "Consumer Services", "India"),
    // India - BSE
    entry("RELIANCE.BO", "Reliance Industries Ltd", "BSE", "INR", "Energy", "India"),
    entry("TCS.BO", "Tata Consultancy Services Ltd", "BSE", "INR", "Information Technology", "India"),
    entry("INFY.BO", "Infosys Ltd", "BSE", "INR", "Information Technology", "India"),
    // United States
    entry("AAPL", "Apple Inc.", "NASDAQ", "USD", "Information Technology", "United States"),
    entry("MSFT", "Microsoft Corporation", "NASDAQ", "USD", "Information Technology", "United States"),
    entry("GOOGL", "Alphabet Inc.", "NASDAQ", "USD", "Communication Services", "United States"),
    entry("AMZN", "Amazon.com Inc.", "NASDAQ", "USD", "Consumer Discretionary", "United States"),
    entry("NVDA", "NVIDIA Corporation", "NASDAQ", "USD", "Information Technology", "United States"),
    entry("META", "Meta Platforms Inc.", "NASDAQ", "USD", "Communication Services", "United States"),
    entry("TSLA", "Tesla Inc.", "NASDAQ", "USD", "Automobile", "United States"),
    entry("JPM", "JPMorgan Chase & Co.", "NYSE", "USD", "Financial Services", "United States"),
    entry("V", "Visa Inc.", "NYSE", "USD", "Financial Services", "United States"),
    entry("JNJ", "Johnson & Johnson", "NYSE", "USD", "Healthcare", "United States"),
];

/// Symbols shown on the trending list, in display order.
pub(super) static TRENDING: &[&str] = &[
    "RELIANCE.NS",
    "TCS.NS",
    "HDFCBANK.NS",
    "INFY.NS",
    "TATAMOTORS.NS",
    "ZOMATO.NS",
    "AAPL",
    "NVDA",
    "TSLA",
    "MSFT",
];
